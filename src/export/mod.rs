// Export pipeline - turns library playlists into .m3u files
// Two passes: count what will be exported, then write it, in source order

pub mod folder;    // destination folder prep and cleanup
pub mod m3u;       // file naming, path rewriting, body rendering
pub mod selection; // which playlists qualify

pub use folder::{prepare_export_folder, purge_playlist_files, FolderAction};
pub use m3u::{is_exportable_audio, playlist_file_name, render_playlist, sanitize_file_name, PathRewriter};
pub use selection::{select_playlist, ExportDecision};

use crate::config::ExportConfig;
use crate::library::{LibraryError, LibrarySession, PlaylistSource};
use crate::logging::pluralise;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unable to create folder '{path}': {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to list folder '{path}': {source}")]
    ListFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write playlist '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// What a run decided and produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Playlists selected in the counting pass
    pub wanted: usize,
    /// Sum of their track counts
    pub total_tracks: usize,
    /// One entry per readable playlist, in source order
    pub decisions: Vec<(String, ExportDecision)>,
    pub written: Vec<PathBuf>,
    /// Selected playlists that had nothing playable in them
    pub no_audio: Vec<String>,
    /// Stale playlist files removed before writing
    pub deleted: usize,
}

/// Run both passes against `source`. The export folder must already be prepared.
pub fn export_playlists<S: PlaylistSource + ?Sized>(
    config: &ExportConfig,
    source: &mut S,
) -> Result<ExportReport, ExportError> {
    info!("Getting playlist details...");
    let playlists: Vec<_> = source.playlists()?.into_iter().flatten().collect();

    let mut report = ExportReport::default();

    // Pass 1: decide once, report the skips worth mentioning, total up
    for playlist in &playlists {
        let decision = select_playlist(playlist, config);
        if let Some(notice) = decision.skip_notice(&playlist.name) {
            info!("{}", notice);
        }
        if decision.is_export() {
            report.wanted += 1;
            report.total_tracks += playlist.track_count();
        }
        report.decisions.push((playlist.name.clone(), decision));
    }

    info!(
        "Found {} (totaling {}) to export.",
        pluralise(report.wanted, "playlist", "playlists"),
        pluralise(report.total_tracks, "track", "tracks")
    );

    // Pass 2: reuse the pass-1 decisions so the i/total counter can't drift
    let selected = playlists
        .iter()
        .zip(&report.decisions)
        .filter(|(_, (_, decision))| decision.is_export())
        .map(|(playlist, _)| playlist);

    let mut written = Vec::new();
    let mut no_audio = Vec::new();

    for (index, playlist) in selected.enumerate() {
        info!(
            "Exporting {}/{}: {} ({})",
            index + 1,
            report.wanted,
            playlist.name,
            pluralise(playlist.track_count(), "track", "tracks")
        );

        let Some(body) = render_playlist(playlist, config) else {
            info!("No audio content to save for playlist: {}", playlist.name);
            no_audio.push(playlist.name.clone());
            continue;
        };

        let path = config.export_folder().join(playlist_file_name(&playlist.name, config));
        fs::write(&path, body).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    report.written = written;
    report.no_audio = no_audio;
    Ok(report)
}

/// Full run: prepare the folder, then export. Close the host either way.
pub fn run_export<S: PlaylistSource + ?Sized>(
    config: &ExportConfig,
    source: &mut S,
    close_host: bool,
) -> Result<ExportReport, ExportError> {
    let result = prepare_export_folder(config).and_then(|action| {
        let mut report = export_playlists(config, source)?;
        if let FolderAction::Purged { deleted } = action {
            report.deleted = deleted;
        }
        Ok(report)
    });

    if close_host {
        source.close_host();
    }

    result
}

/// Open the library file, run the export, and release the library before returning
pub fn export_library_file(
    config: &ExportConfig,
    library_path: &Path,
    close_host: bool,
) -> Result<ExportReport, ExportError> {
    let mut session = LibrarySession::open(library_path)?;
    info!("Reading playlists from: {}", session.path().display());

    let result = run_export(config, &mut session, close_host);
    drop(session);
    result
}
