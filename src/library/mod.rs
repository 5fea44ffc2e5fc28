// Library access - read-only views over the media application's playlists
// The exporter only ever sees these types, never the host's own objects

pub mod itunes; // reader for the exported library XML
pub mod plist;  // property-list parsing underneath it

pub use itunes::LibrarySession;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unable to read library {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Library file is malformed: {0}")]
    Malformed(#[from] plist::PlistError),

    #[error("Unable to access playlists: {0}")]
    PlaylistsUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    /// Created by the user (regular or smart)
    User,
    /// The library itself, devices, shared sources...
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    None,
    /// Built-in purpose list (Music, Podcasts, Purchased) or a folder
    Purpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    File,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub kind: TrackKind,
    pub location: Option<String>,
    pub duration_seconds: u64,
    pub artist: String,
    pub title: String,
}

impl Track {
    /// File-backed track at `location`; mostly for building fixtures
    pub fn file(location: impl Into<String>, duration_seconds: u64, artist: &str, title: &str) -> Self {
        Self {
            kind: TrackKind::File,
            location: Some(location.into()),
            duration_seconds,
            artist: artist.to_string(),
            title: title.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub kind: PlaylistKind,
    pub visible: bool,
    pub special_kind: SpecialKind,
    pub is_smart: bool,
    /// Entries the source could not read are `None` and get skipped
    pub tracks: Vec<Option<Track>>,
}

impl Playlist {
    /// Visible, non-smart user playlist
    pub fn user(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            kind: PlaylistKind::User,
            visible: true,
            special_kind: SpecialKind::None,
            is_smart: false,
            tracks: tracks.into_iter().map(Some).collect(),
        }
    }

    pub fn smart(mut self) -> Self {
        self.is_smart = true;
        self
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Narrow read-only capability the exporter needs from a media library
pub trait PlaylistSource {
    /// Enumerate every playlist in source order
    fn playlists(&mut self) -> Result<Vec<Option<Playlist>>, LibraryError>;

    /// Close the host application if this run launched it. Never fatal.
    fn close_host(&mut self) {}
}

/// In-memory source, handy for tests and dry runs
impl PlaylistSource for Vec<Option<Playlist>> {
    fn playlists(&mut self) -> Result<Vec<Option<Playlist>>, LibraryError> {
        Ok(self.clone())
    }
}
