use super::scan::is_audio_file;
use super::*;
use crate::config::LibrarySettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn t(path: &str) -> Track {
    Track::from_path(Path::new(path), None)
}

#[test]
fn track_key_is_file_name_with_extension() {
    assert_eq!(track_key(Path::new("/music/a/Song.mp3")), "Song.mp3");
    assert_eq!(display_name("Song.mp3"), "Song");
    assert_eq!(display_name("no_ext"), "no_ext");
    assert_eq!(display_name(".hidden"), ".hidden");
    assert_eq!(display_name("a.b.flac"), "a.b");
}

#[test]
fn lookup_maps_keys_to_indices_in_load_order() {
    let lib = Library::new(vec![t("/m/A.mp3"), t("/m/B.mp3"), t("/m/C.mp3")]);
    assert_eq!(lib.len(), 3);
    assert_eq!(lib.index_of("B.mp3"), Some(1));
    assert_eq!(lib.index_of("missing.mp3"), None);
    assert_eq!(lib.key_at(2), Some("C.mp3"));
}

#[test]
fn duplicate_keys_are_last_write_wins_and_reported() {
    let mut lib = Library::new(vec![t("/m/one/A.mp3"), t("/m/B.mp3")]);
    let shadowed = lib.append(vec![t("/m/two/A.mp3")]);

    assert_eq!(shadowed, vec!["A.mp3".to_string()]);
    assert_eq!(lib.index_of("A.mp3"), Some(2));
    assert_eq!(
        lib.by_key("A.mp3").map(|t| t.path.clone()),
        Some(PathBuf::from("/m/two/A.mp3"))
    );
    // The shadowed track is still listed.
    assert_eq!(lib.len(), 3);
}

#[test]
fn is_audio_file_matches_configured_extensions_case_insensitive() {
    let settings = LibrarySettings::default();
    assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.m4a"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
}

#[test]
fn scan_filters_non_audio_and_keeps_name_order() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("a.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let tracks = scan(&[dir.path()], &LibrarySettings::default());
    let keys: Vec<&str> = tracks.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["a.ogg", "b.MP3"]);
    assert!(tracks.iter().all(|t| t.duration.is_none()));
}

#[test]
fn scan_accepts_individual_files() {
    let dir = tempdir().unwrap();
    let song = dir.path().join("song.wav");
    let notes = dir.path().join("notes.md");
    fs::write(&song, b"x").unwrap();
    fs::write(&notes, b"x").unwrap();

    let tracks = scan(&[song.clone(), notes], &LibrarySettings::default());
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].path, song);
}

#[test]
fn scan_skips_hidden_by_default_and_respects_recursive_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
    fs::write(dir.path().join("root.mp3"), b"x").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"x").unwrap();

    let all = scan(&[dir.path()], &LibrarySettings::default());
    let keys: Vec<&str> = all.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["root.mp3", "child.mp3"]);

    let settings = LibrarySettings {
        recursive: false,
        ..LibrarySettings::default()
    };
    let shallow = scan(&[dir.path()], &settings);
    assert_eq!(shallow.len(), 1);
    assert_eq!(shallow[0].key, "root.mp3");
}
