// End-to-end export runs against a library XML on disk

use playlift::export::{export_library_file, run_export, ExportDecision, ExportError};
use playlift::library::{LibraryError, LibrarySession};
use playlift::ExportConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Major Version</key><integer>1</integer>
	<key>Music Folder</key><string>file:///srv/music/</string>
	<key>Tracks</key>
	<dict>
		<key>1</key>
		<dict>
			<key>Track ID</key><integer>1</integer>
			<key>Name</key><string>Windowlicker</string>
			<key>Artist</key><string>Aphex Twin</string>
			<key>Total Time</key><integer>366000</integer>
			<key>Track Type</key><string>File</string>
			<key>Location</key><string>file:///srv/music/Aphex%20Twin/Windowlicker.mp3</string>
		</dict>
		<key>2</key>
		<dict>
			<key>Track ID</key><integer>2</integer>
			<key>Name</key><string>Teardrop</string>
			<key>Artist</key><string>Massive Attack</string>
			<key>Total Time</key><integer>330500</integer>
			<key>Track Type</key><string>File</string>
			<key>Location</key><string>file:///srv/music/Massive%20Attack/Teardrop.M4A</string>
		</dict>
		<key>3</key>
		<dict>
			<key>Track ID</key><integer>3</integer>
			<key>Name</key><string>Field Recording</string>
			<key>Artist</key><string>Nobody</string>
			<key>Total Time</key><integer>60000</integer>
			<key>Track Type</key><string>File</string>
			<key>Location</key><string>file:///srv/music/field.flac</string>
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
				<dict><key>Track ID</key><integer>1</integer></dict>
				<dict><key>Track ID</key><integer>2</integer></dict>
				<dict><key>Track ID</key><integer>3</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Late Night</string>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>1</integer></dict>
				<dict><key>Track ID</key><integer>2</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Recently Added</string>
			<key>Smart Info</key><data>AQEAAwAAAAIAAAAZ</data>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>2</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>zz Scratch</string>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>1</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Lossless Only</string>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>3</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Nothing Yet</string>
		</dict>
		<dict>
			<key>Name</key><string>AC/DC: Live?</string>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>1</integer></dict>
			</array>
		</dict>
	</array>
</dict>
</plist>
"#;

fn write_library(dir: &Path, xml: &str) -> std::path::PathBuf {
    let path = dir.join("iTunes Music Library.xml");
    fs::write(&path, xml).unwrap();
    path
}

fn playlist_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_full_export_with_defaults() {
    let work = TempDir::new().unwrap();
    let library = write_library(work.path(), LIBRARY);
    let out = work.path().join("playlists");

    let config = ExportConfig::builder(&out).build().unwrap();
    let mut session = LibrarySession::open(&library).unwrap();
    let report = run_export(&config, &mut session, false).unwrap();

    assert_eq!(report.wanted, 5);
    assert_eq!(report.total_tracks, 6);
    assert_eq!(report.no_audio, vec!["Lossless Only".to_string()]);
    assert_eq!(
        playlist_files(&out),
        vec!["AC_DC_ Live_.m3u", "Late Night.m3u", "Recently Added.m3u", "zz Scratch.m3u"]
    );

    let late_night = fs::read_to_string(out.join("Late Night.m3u")).unwrap();
    assert_eq!(
        late_night,
        "#EXTM3U\r\n\
         #PLAYLIST:Late Night\r\n\
         #EXTINF:366,Aphex Twin - Windowlicker\r\n\
         /srv/music/Aphex Twin/Windowlicker.mp3\r\n\
         #EXTINF:330,Massive Attack - Teardrop\r\n\
         /srv/music/Massive Attack/Teardrop.M4A\r\n"
    );
}

#[test]
fn test_filters_and_rewrites() {
    let work = TempDir::new().unwrap();
    let library = write_library(work.path(), LIBRARY);
    let out = work.path().join("phone");

    let config = ExportConfig::builder(&out)
        .ignore_smart(true)
        .ignore_prefix("ZZ")
        .base_path("/SRV/music/")
        .find_replace("massive attack", "MA")
        .unix_style(true)
        .append_eight(true)
        .build()
        .unwrap();
    let mut session = LibrarySession::open(&library).unwrap();
    let report = run_export(&config, &mut session, false).unwrap();

    let decision = |name: &str| {
        report
            .decisions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| *d)
            .unwrap()
    };
    assert_eq!(decision("Library"), ExportDecision::SkipNotUserPlaylist);
    assert_eq!(decision("Recently Added"), ExportDecision::SkipSmart);
    assert_eq!(decision("zz Scratch"), ExportDecision::SkipPrefix);
    assert_eq!(decision("Nothing Yet"), ExportDecision::SkipEmpty);
    assert_eq!(decision("Late Night"), ExportDecision::Export);

    assert_eq!(playlist_files(&out), vec!["AC_DC_ Live_.m3u8", "Late Night.m3u8"]);
    assert_eq!(
        fs::read_to_string(out.join("Late Night.m3u8")).unwrap(),
        "#EXTM3U\n#PLAYLIST:Late Night\n\
         #EXTINF:366,Aphex Twin - Windowlicker\nAphex Twin/Windowlicker.mp3\n\
         #EXTINF:330,Massive Attack - Teardrop\nMA/Teardrop.M4A\n"
    );
}

#[test]
fn test_delete_existing_with_nothing_to_export() {
    let work = TempDir::new().unwrap();
    let library = write_library(work.path(), LIBRARY);
    let out = work.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("old.m3u"), "#EXTM3U\r\n").unwrap();
    fs::write(out.join("older.M3U8"), "x\n").unwrap();
    fs::write(out.join("notes.txt"), "keep me").unwrap();

    // Regular playlists are off and the one smart playlist is excluded by prefix
    let config = ExportConfig::builder(&out)
        .ignore_regular(true)
        .ignore_prefix("Recently")
        .delete_existing(true)
        .build()
        .unwrap();
    let mut session = LibrarySession::open(&library).unwrap();
    let report = run_export(&config, &mut session, true).unwrap();

    assert_eq!(report.wanted, 0);
    assert_eq!(report.deleted, 2);
    assert!(report.written.is_empty());
    assert_eq!(playlist_files(&out), vec!["notes.txt"]);
}

#[test]
fn test_missing_library_fails_before_anything_is_written() {
    let work = TempDir::new().unwrap();
    let err = LibrarySession::open(work.path().join("nope.xml")).unwrap_err();
    assert!(matches!(err, LibraryError::NotFound(_)));
}

#[test]
fn test_library_without_playlists_is_fatal() {
    let work = TempDir::new().unwrap();
    let library = write_library(
        work.path(),
        "<plist version=\"1.0\"><dict><key>Tracks</key><dict/></dict></plist>",
    );
    let out = work.path().join("out");

    let config = ExportConfig::builder(&out).build().unwrap();
    let mut session = LibrarySession::open(&library).unwrap();
    let err = run_export(&config, &mut session, false).unwrap_err();

    assert!(matches!(
        err,
        ExportError::Library(LibraryError::PlaylistsUnavailable(_))
    ));
    // The folder is prepared before the library is read
    assert!(out.is_dir());
    assert!(playlist_files(&out).is_empty());
}

#[test]
fn test_network_share_library_strips_base_path() {
    let work = TempDir::new().unwrap();
    let nas_library = LIBRARY.replace("file:///srv/music/", "file://localhost//nas/share/");
    let library = write_library(work.path(), &nas_library);
    let out = work.path().join("out");

    let config = ExportConfig::builder(&out)
        .base_path("\\\\NAS\\share\\")
        .not_extended(true)
        .build()
        .unwrap();
    let mut session = LibrarySession::open(&library).unwrap();
    run_export(&config, &mut session, false).unwrap();

    assert_eq!(
        fs::read_to_string(out.join("Late Night.m3u")).unwrap(),
        "Aphex Twin\\Windowlicker.mp3\r\nMassive Attack\\Teardrop.M4A\r\n"
    );
}

#[test]
fn test_export_library_file_releases_library_when_done() {
    let work = TempDir::new().unwrap();
    let library = write_library(work.path(), LIBRARY);
    let out = work.path().join("out");
    let config = ExportConfig::builder(&out).ignore_smart(true).build().unwrap();

    let report = export_library_file(&config, &library, false).unwrap();
    assert_eq!(report.wanted, 4);

    // Nothing holds on to the library afterwards
    fs::remove_file(&library).unwrap();
    assert!(matches!(
        export_library_file(&config, &library, false),
        Err(ExportError::Library(LibraryError::NotFound(_)))
    ));
}
