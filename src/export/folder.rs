// Destination folder handling before anything gets written

use super::ExportError;
use crate::config::ExportConfig;
use crate::logging::pluralise;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderAction {
    Created,
    Existing,
    Purged { deleted: usize },
}

/// Make sure the export folder exists, clearing old playlists out of it if asked
pub fn prepare_export_folder(config: &ExportConfig) -> Result<FolderAction, ExportError> {
    let folder = config.export_folder();

    if folder.is_dir() {
        if config.delete_existing() {
            info!("Deleting existing playlists from: {}", folder.display());
            let deleted = purge_playlist_files(folder)?;
            info!("Successfully deleted {}.", pluralise(deleted, "playlist", "playlists"));
            return Ok(FolderAction::Purged { deleted });
        }

        info!("Exporting to folder: {}", folder.display());
        return Ok(FolderAction::Existing);
    }

    fs::create_dir_all(folder).map_err(|source| ExportError::CreateFolder {
        path: folder.to_path_buf(),
        source,
    })?;
    info!("Created folder for export: {}", folder.display());
    Ok(FolderAction::Created)
}

/// Delete `.m3u`/`.m3u8` files directly inside `dir`, returning how many went.
/// A file that won't delete is logged and left behind.
pub fn purge_playlist_files(dir: &Path) -> Result<usize, ExportError> {
    let list_error = |source| ExportError::ListFolder {
        path: dir.to_path_buf(),
        source,
    };

    let mut deleted = 0;
    for entry in fs::read_dir(dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if !path.is_file() || !is_playlist_file(&path) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("Unable to delete {}: {}", path.display(), e),
        }
    }

    Ok(deleted)
}

fn is_playlist_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u") || ext.eq_ignore_ascii_case("m3u8"))
}
