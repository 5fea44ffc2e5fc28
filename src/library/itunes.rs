// Reader for the library XML the media application exports ("iTunes Music Library.xml")
// Maps the raw plist into the Playlist/Track views the exporter works with

use super::plist::{self, PlistValue};
use super::{LibraryError, Playlist, PlaylistKind, PlaylistSource, SpecialKind, Track, TrackKind};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An open library. Dropping it releases everything read from the file.
#[derive(Debug)]
pub struct LibrarySession {
    path: PathBuf,
    root: Option<PlistValue>,
}

impl LibrarySession {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LibraryError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(LibraryError::NotFound(path));
        }

        let xml = fs::read_to_string(&path).map_err(|source| LibraryError::Read {
            path: path.clone(),
            source,
        })?;
        let root = plist::parse(&xml)?;
        debug!("Opened library {}", path.display());

        Ok(Self { path, root: Some(root) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn root(&self) -> Result<&PlistValue, LibraryError> {
        self.root
            .as_ref()
            .ok_or_else(|| LibraryError::PlaylistsUnavailable("library session already released".to_string()))
    }
}

impl PlaylistSource for LibrarySession {
    fn playlists(&mut self) -> Result<Vec<Option<Playlist>>, LibraryError> {
        let root = self.root()?;

        let entries = root
            .get("Playlists")
            .and_then(PlistValue::as_array)
            .ok_or_else(|| LibraryError::PlaylistsUnavailable("no Playlists array in library".to_string()))?;

        // Tracks dict is keyed by the decimal track id
        let tracks: HashMap<i64, &PlistValue> = root
            .get("Tracks")
            .and_then(PlistValue::as_dict)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(key, value)| key.parse().ok().map(|id| (id, value)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(entries.iter().map(|entry| read_playlist(entry, &tracks)).collect())
    }

    fn close_host(&mut self) {
        // A library file has no host process behind it, so there is never one we launched
        info!("The media application was not started by playlift; leaving it running.");
    }
}

impl Drop for LibrarySession {
    fn drop(&mut self) {
        if self.root.take().is_some() {
            debug!("Released library {}", self.path.display());
        }
    }
}

fn read_playlist(entry: &PlistValue, library_tracks: &HashMap<i64, &PlistValue>) -> Option<Playlist> {
    let Some(name) = entry.get("Name").and_then(PlistValue::as_str) else {
        warn!("Skipping unreadable playlist entry");
        return None;
    };

    let flag = |key: &str| entry.get(key).and_then(PlistValue::as_bool).unwrap_or(false);

    let kind = if flag("Master") { PlaylistKind::Other } else { PlaylistKind::User };
    let visible = entry.get("Visible").and_then(PlistValue::as_bool).unwrap_or(true);
    let distinguished = entry
        .get("Distinguished Kind")
        .and_then(PlistValue::as_integer)
        .unwrap_or(0);
    let special_kind = if distinguished != 0 || flag("Folder") {
        SpecialKind::Purpose
    } else {
        SpecialKind::None
    };

    let items = entry
        .get("Playlist Items")
        .and_then(PlistValue::as_array)
        .unwrap_or_default();

    let tracks = items
        .iter()
        .map(|item| {
            item.get("Track ID")
                .and_then(PlistValue::as_integer)
                .and_then(|id| library_tracks.get(&id))
                .and_then(|track| read_track(track))
        })
        .collect();

    Some(Playlist {
        name: name.to_string(),
        kind,
        visible,
        special_kind,
        is_smart: entry.get("Smart Info").is_some(),
        tracks,
    })
}

fn read_track(entry: &PlistValue) -> Option<Track> {
    entry.as_dict()?;

    let text = |key: &str| {
        entry
            .get(key)
            .and_then(PlistValue::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let location = entry
        .get("Location")
        .and_then(PlistValue::as_str)
        .and_then(location_from_url);

    let kind = match entry.get("Track Type").and_then(PlistValue::as_str) {
        Some("File") => TrackKind::File,
        Some(_) => TrackKind::Other,
        None if location.is_some() => TrackKind::File,
        None => TrackKind::Other,
    };

    let duration_ms = entry
        .get("Total Time")
        .and_then(PlistValue::as_integer)
        .unwrap_or(0)
        .max(0) as u64;

    Some(Track {
        kind,
        location,
        duration_seconds: duration_ms / 1000,
        artist: text("Artist"),
        title: text("Name"),
    })
}

/// Turn a `file://` URL into the path the host application would report.
/// Drive-letter paths come back with backslashes, everything else stays POSIX.
pub fn location_from_url(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("file://localhost")
        .or_else(|| url.strip_prefix("file://"))?;

    let decoded = urlencoding::decode(rest).ok()?.into_owned();

    let bytes = decoded.as_bytes();
    let has_drive = bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':';
    if has_drive {
        return Some(decoded[1..].replace('/', "\\"));
    }

    // Shares come as file://localhost//server/share/... or file://server/share/...
    if let Some(share) = decoded.strip_prefix("//") {
        return Some(format!("\\\\{}", share.replace('/', "\\")));
    }
    if !decoded.starts_with('/') {
        return Some(format!("\\\\{}", decoded.replace('/', "\\")));
    }

    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>Tracks</key>
	<dict>
		<key>101</key>
		<dict>
			<key>Track ID</key><integer>101</integer>
			<key>Name</key><string>Blue Monday</string>
			<key>Artist</key><string>New Order</string>
			<key>Total Time</key><integer>448573</integer>
			<key>Track Type</key><string>File</string>
			<key>Location</key><string>file://localhost/C:/Users/me/Music/New%20Order/Blue%20Monday.mp3</string>
		</dict>
		<key>102</key>
		<dict>
			<key>Track ID</key><integer>102</integer>
			<key>Name</key><string>Radio Stream</string>
			<key>Track Type</key><string>URL</string>
			<key>Location</key><string>http://radio.example/stream</string>
		</dict>
	</dict>
	<key>Playlists</key>
	<array>
		<dict>
			<key>Name</key><string>Library</string>
			<key>Master</key><true/>
			<key>Visible</key><false/>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>101</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Music</string>
			<key>Distinguished Kind</key><integer>4</integer>
		</dict>
		<dict>
			<key>Name</key><string>Eighties</string>
			<key>Smart Info</key><data>AQEAAw==</data>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>101</integer></dict>
				<dict><key>Track ID</key><integer>999</integer></dict>
				<dict><key>Track ID</key><integer>102</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Playlist ID</key><integer>7</integer>
		</dict>
		<dict>
			<key>Name</key><string>Gym</string>
			<key>Folder</key><true/>
		</dict>
	</array>
</dict>
</plist>"#;

    fn open_fixture() -> (NamedTempFile, LibrarySession) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LIBRARY.as_bytes()).unwrap();
        let session = LibrarySession::open(file.path()).unwrap();
        (file, session)
    }

    #[test]
    fn test_maps_playlist_flags() {
        let (_file, mut session) = open_fixture();
        let playlists = session.playlists().unwrap();
        assert_eq!(playlists.len(), 5);

        let library = playlists[0].as_ref().unwrap();
        assert_eq!(library.kind, PlaylistKind::Other);
        assert!(!library.visible);

        let music = playlists[1].as_ref().unwrap();
        assert_eq!(music.special_kind, SpecialKind::Purpose);
        assert_eq!(music.track_count(), 0);

        let eighties = playlists[2].as_ref().unwrap();
        assert_eq!(eighties.kind, PlaylistKind::User);
        assert!(eighties.visible);
        assert!(eighties.is_smart);
        assert_eq!(eighties.special_kind, SpecialKind::None);

        // Nameless entry is unreadable
        assert!(playlists[3].is_none());

        let folder = playlists[4].as_ref().unwrap();
        assert_eq!(folder.special_kind, SpecialKind::Purpose);
    }

    #[test]
    fn test_maps_tracks_in_order() {
        let (_file, mut session) = open_fixture();
        let playlists = session.playlists().unwrap();
        let eighties = playlists[2].as_ref().unwrap();

        assert_eq!(eighties.track_count(), 3);

        let first = eighties.tracks[0].as_ref().unwrap();
        assert_eq!(first.kind, TrackKind::File);
        assert_eq!(first.location.as_deref(), Some(r"C:\Users\me\Music\New Order\Blue Monday.mp3"));
        assert_eq!(first.duration_seconds, 448);
        assert_eq!(first.artist, "New Order");
        assert_eq!(first.title, "Blue Monday");

        // Dangling track id
        assert!(eighties.tracks[1].is_none());

        let stream = eighties.tracks[2].as_ref().unwrap();
        assert_eq!(stream.kind, TrackKind::Other);
        assert_eq!(stream.location, None);
        assert_eq!(stream.artist, "");
    }

    #[test]
    fn test_missing_library_is_not_found() {
        let err = LibrarySession::open("/definitely/not/here/Library.xml").unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(_)));
    }

    #[test]
    fn test_library_without_playlists_is_unavailable() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<plist><dict><key>Tracks</key><dict/></dict></plist>").unwrap();

        let mut session = LibrarySession::open(file.path()).unwrap();
        assert!(matches!(session.playlists(), Err(LibraryError::PlaylistsUnavailable(_))));
    }

    #[test]
    fn test_location_from_url() {
        assert_eq!(
            location_from_url("file://localhost/C:/Music/A%20B/c.m4a").as_deref(),
            Some(r"C:\Music\A B\c.m4a")
        );
        assert_eq!(
            location_from_url("file:///Users/me/Music/caf%C3%A9.mp3").as_deref(),
            Some("/Users/me/Music/café.mp3")
        );
        assert_eq!(
            location_from_url("file://nas/music/a.mp3").as_deref(),
            Some(r"\\nas\music\a.mp3")
        );
        assert_eq!(
            location_from_url("file://localhost//nas/share/Music/a%20b.mp3").as_deref(),
            Some(r"\\nas\share\Music\a b.mp3")
        );
        assert_eq!(location_from_url("http://example.com/a.mp3"), None);
    }
}
