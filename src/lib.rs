// playlift - export media library playlists to .m3u/.m3u8 files
// Library reading, export pipeline and the weekly release check live here; main.rs just wires them up

pub mod cli;      // command line arguments
pub mod config;   // settings file and per-run export options
pub mod export;   // selection, rendering, writing
pub mod library;  // playlists and tracks from the library XML
pub mod logging;  // console + rolling file output
pub mod update;   // is there a newer release?

pub use config::{AppPaths, ConfigError, ExportConfig, Settings};
pub use export::{export_library_file, run_export, ExportDecision, ExportError, ExportReport};
pub use library::{LibraryError, LibrarySession, Playlist, PlaylistSource, Track};
pub use update::{check_latest_release, AppVersion, ReleaseFetcher, VersionCheckResult};
