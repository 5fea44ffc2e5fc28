// Which playlists get exported
// First matching rule wins; the order matters because only some skips are reported

use crate::config::ExportConfig;
use crate::library::{Playlist, PlaylistKind, SpecialKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDecision {
    Export,
    SkipEmpty,
    SkipSmart,
    SkipRegular,
    SkipPrefix,
    /// Library, hidden or built-in lists. Never reported.
    SkipNotUserPlaylist,
}

impl ExportDecision {
    pub fn is_export(self) -> bool {
        self == ExportDecision::Export
    }

    /// Operator-facing reason for the skips worth mentioning
    pub fn skip_notice(self, name: &str) -> Option<String> {
        let reason = match self {
            ExportDecision::SkipEmpty => "empty playlist",
            ExportDecision::SkipSmart => "smart playlist",
            ExportDecision::SkipRegular => "regular playlist",
            ExportDecision::SkipPrefix => "playlist with prefix",
            ExportDecision::Export | ExportDecision::SkipNotUserPlaylist => return None,
        };
        Some(format!("Ignoring {}: {}", reason, name))
    }
}

/// Pure function of its inputs, so repeated calls always agree
pub fn select_playlist(playlist: &Playlist, config: &ExportConfig) -> ExportDecision {
    if playlist.kind != PlaylistKind::User
        || !playlist.visible
        || playlist.special_kind != SpecialKind::None
    {
        return ExportDecision::SkipNotUserPlaylist;
    }

    if playlist.track_count() == 0 {
        return ExportDecision::SkipEmpty;
    }

    if config.ignore_smart() && playlist.is_smart {
        return ExportDecision::SkipSmart;
    }

    if config.ignore_regular() && !playlist.is_smart {
        return ExportDecision::SkipRegular;
    }

    if config
        .ignore_prefix()
        .is_some_and(|prefix| prefix.is_prefix_of(&playlist.name))
    {
        return ExportDecision::SkipPrefix;
    }

    ExportDecision::Export
}
