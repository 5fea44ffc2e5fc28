// M3U rendering - file names, location rewriting and playlist bodies

use crate::config::ExportConfig;
use crate::library::{Playlist, TrackKind};

/// Extensions the exporter treats as audio (lowercase, no dot)
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "m4a", "m4b"];

/// Characters no target filesystem accepts in a file name
const ILLEGAL_FILE_NAME_CHARS: [char; 9] = ['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

/// Replace every character that can't appear in a file name with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

pub fn playlist_file_name(name: &str, config: &ExportConfig) -> String {
    format!("{}{}", sanitize_file_name(name), config.file_extension())
}

/// True if `location` ends in one of the audio extensions, any case.
/// Works on both separator styles since locations may come from another OS.
pub fn is_exportable_audio(location: &str) -> bool {
    let file_name = location.rsplit(['/', '\\']).next().unwrap_or(location);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => AUDIO_EXTENSIONS.iter().any(|audio| ext.eq_ignore_ascii_case(audio)),
        None => false,
    }
}

/// Rewrites track locations: base path first, then slashes, then find/replace
pub struct PathRewriter<'a> {
    config: &'a ExportConfig,
}

impl<'a> PathRewriter<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    pub fn rewrite(&self, location: &str) -> String {
        let mut path = match self.config.base_path() {
            Some(base) => base.strip_prefix(location).unwrap_or(location).to_string(),
            None => location.to_string(),
        };

        if self.config.unix_style() {
            path = path.replace('\\', "/");
        }

        if let Some(find) = self.config.find() {
            path = find.replace_all(&path, self.config.replace()).into_owned();
        }

        path
    }
}

/// Render the playlist file body, or `None` if no track made it in
pub fn render_playlist(playlist: &Playlist, config: &ExportConfig) -> Option<String> {
    let eol = config.line_ending();
    let rewriter = PathRewriter::new(config);
    let mut body = String::new();
    let mut has_audio = false;

    if !config.not_extended() {
        body.push_str("#EXTM3U");
        body.push_str(eol);
        body.push_str("#PLAYLIST:");
        body.push_str(&playlist.name);
        body.push_str(eol);
    }

    for track in playlist.tracks.iter().flatten() {
        if track.kind != TrackKind::File {
            continue;
        }
        let Some(location) = track.location.as_deref() else {
            continue;
        };
        if !is_exportable_audio(location) {
            continue;
        }

        has_audio = true;
        if !config.not_extended() {
            body.push_str(&format!(
                "#EXTINF:{},{} - {}{}",
                track.duration_seconds, track.artist, track.title, eol
            ));
        }
        body.push_str(&rewriter.rewrite(location));
        body.push_str(eol);
    }

    has_audio.then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Track;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("AC/DC: Best?"), "AC_DC_ Best_");
        assert_eq!(sanitize_file_name("Tab\there"), "Tab_here");
        assert_eq!(sanitize_file_name("Café del Mar"), "Café del Mar");
    }

    #[test]
    fn test_playlist_file_name_uses_configured_extension() {
        let plain = ExportConfig::builder("/out").build().unwrap();
        let eight = ExportConfig::builder("/out").append_eight(true).build().unwrap();

        assert_eq!(playlist_file_name("Chill <2024>", &plain), "Chill _2024_.m3u");
        assert_eq!(playlist_file_name("Chill", &eight), "Chill.m3u8");
    }

    #[test]
    fn test_audio_extension_check() {
        assert!(is_exportable_audio("C:\\Music\\song.MP3"));
        assert!(is_exportable_audio("/music/book.m4b"));
        assert!(is_exportable_audio("/music/a.b/song.m4a"));
        assert!(!is_exportable_audio("/music/song.wav"));
        assert!(!is_exportable_audio("C:\\Music.mp3\\noext"));
        assert!(!is_exportable_audio("/music/mp3"));
    }

    #[test]
    fn test_rewrite_strips_base_before_swapping_slashes() {
        let config = ExportConfig::builder("/out")
            .base_path("/music")
            .unix_style(true)
            .build()
            .unwrap();
        let rewriter = PathRewriter::new(&config);

        assert_eq!(rewriter.rewrite("/music\\A\\b.mp3"), "/A/b.mp3");
        assert_eq!(rewriter.rewrite("/MUSIC\\A\\b.mp3"), "/A/b.mp3");

        // Base only strips when the raw location starts with it; swapping first would have matched here
        let config = ExportConfig::builder("/out")
            .base_path("C:/music")
            .unix_style(true)
            .build()
            .unwrap();
        assert_eq!(PathRewriter::new(&config).rewrite("C:\\music\\b.mp3"), "C:/music/b.mp3");
    }

    #[test]
    fn test_rewrite_find_replace_runs_last() {
        let config = ExportConfig::builder("/out")
            .unix_style(true)
            .find_replace("c:/users/me/music", "/mnt/music")
            .build()
            .unwrap();

        assert_eq!(
            PathRewriter::new(&config).rewrite("C:\\Users\\Me\\Music\\a.mp3"),
            "/mnt/music/a.mp3"
        );
    }

    #[test]
    fn test_render_extended_playlist() {
        let config = ExportConfig::builder("/out").build().unwrap();
        let mut playlist = Playlist::user(
            "Mix",
            vec![
                Track::file("C:\\m\\one.mp3", 200, "Artist", "One"),
                Track::file("C:\\m\\skip.wav", 100, "Artist", "Skip"),
                Track::file("C:\\m\\two.m4a", 185, "Other", "Two"),
            ],
        );
        playlist.tracks.push(None);

        let body = render_playlist(&playlist, &config).unwrap();
        assert_eq!(
            body,
            "#EXTM3U\r\n#PLAYLIST:Mix\r\n\
             #EXTINF:200,Artist - One\r\nC:\\m\\one.mp3\r\n\
             #EXTINF:185,Other - Two\r\nC:\\m\\two.m4a\r\n"
        );
    }

    #[test]
    fn test_render_basic_playlist_with_unix_endings() {
        let config = ExportConfig::builder("/out")
            .not_extended(true)
            .unix_style(true)
            .build()
            .unwrap();
        let mut stream = Track::file("http://x/a.mp3", 0, "", "");
        stream.kind = TrackKind::Other;
        let mut missing = Track::file("", 0, "", "");
        missing.location = None;

        let playlist = Playlist::user(
            "Basic",
            vec![stream, missing, Track::file("D:\\a\\b.mp3", 1, "x", "y")],
        );

        assert_eq!(render_playlist(&playlist, &config).unwrap(), "D:/a/b.mp3\n");
    }

    #[test]
    fn test_non_audio_playlist_renders_nothing() {
        let config = ExportConfig::builder("/out").build().unwrap();
        let playlist = Playlist::user(
            "Wavs",
            vec![Track::file("/a.wav", 1, "a", "b"), Track::file("/b.flac", 1, "a", "b")],
        );

        assert_eq!(render_playlist(&playlist, &config), None);
    }
}
