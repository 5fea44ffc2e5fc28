// Command line surface for playlift
// clap handles the shape of the arguments, ExportConfig handles what they mean

use crate::config::{ConfigError, ExportConfig};
use crate::update::{AppVersion, GITHUB_REPO};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Two-letter switches from earlier releases that clap would read as bundled short flags
const LEGACY_SWITCHES: [(&str, &str); 4] = [
    ("-ns", "--no-smart"),
    ("-np", "--no-playlist"),
    ("-ne", "--not-extended"),
    ("-nc", "--no-check"),
];

#[derive(Debug, Parser)]
#[command(name = "playlift")]
#[command(version)]
#[command(about = "Export iTunes playlists to .m3u/.m3u8 files")]
pub struct Args {
    /// Folder the playlist files are written to
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Skip smart playlists
    #[arg(long, conflicts_with = "no_playlist")]
    pub no_smart: bool,

    /// Skip regular (non-smart) playlists
    #[arg(long, visible_alias = "no-playlists")]
    pub no_playlist: bool,

    /// Skip playlists whose name starts with this text (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub ignore: Option<String>,

    /// Forward slashes and LF line endings
    #[arg(short, long, visible_short_alias = 'l', visible_alias = "linux")]
    pub unix: bool,

    /// Write .m3u8 instead of .m3u
    #[arg(short = '8', long = "append-8")]
    pub append_eight: bool,

    /// Plain list of paths, no #EXTM3U header or #EXTINF lines
    #[arg(short, long)]
    pub not_extended: bool,

    /// Text to find in each track path (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub find: Option<String>,

    /// Replacement for --find
    #[arg(short, long, value_name = "TEXT", requires = "find")]
    pub replace: Option<String>,

    /// Path prefix stripped from each track path (case-insensitive)
    #[arg(short, long, value_name = "PATH")]
    pub base_path: Option<String>,

    /// Delete existing .m3u/.m3u8 files in the destination first
    #[arg(short, long)]
    pub delete: bool,

    /// Close the music application when done
    #[arg(short, long)]
    pub close: bool,

    /// Don't check GitHub for a newer release
    #[arg(long)]
    pub no_check: bool,

    /// Library XML to read instead of the configured one
    #[arg(long, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Parse the process arguments, accepting the older `-ns`/`-np`/`-ne`/`-nc` spellings
    pub fn parse_with_legacy() -> Self {
        Self::parse_from(expand_legacy_switches(std::env::args_os()))
    }

    pub fn to_export_config(&self) -> Result<ExportConfig, ConfigError> {
        ExportConfig::builder(&self.destination)
            .ignore_smart(self.no_smart)
            .ignore_regular(self.no_playlist)
            .ignore_prefix(self.ignore.clone().unwrap_or_default())
            .unix_style(self.unix)
            .find_replace(
                self.find.clone().unwrap_or_default(),
                self.replace.clone().unwrap_or_default(),
            )
            .append_eight(self.append_eight)
            .not_extended(self.not_extended)
            .delete_existing(self.delete)
            .base_path(self.base_path.clone().unwrap_or_default())
            .build()
    }
}

/// Rewrite the old two-letter switches to their long names, any case
pub fn expand_legacy_switches<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let long = arg.to_str().and_then(|text| {
                LEGACY_SWITCHES
                    .iter()
                    .find(|(short, _)| text.eq_ignore_ascii_case(short))
                    .map(|(_, long)| *long)
            });
            long.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

/// Lines printed at startup
pub fn banner(version: AppVersion) -> [String; 3] {
    [
        format!("playlift v{}", version),
        "Export iTunes audio playlists as standard or extended .m3u files.".to_string(),
        format!("https://github.com/{}", GITHUB_REPO),
    ]
}
