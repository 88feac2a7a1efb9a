use super::*;
use crate::playlists::{Playlist, PlaylistCollection};
use tempfile::tempdir;

fn file_storage(dir: &std::path::Path) -> Storage {
    Storage::new(Box::new(FileBlobStore::new(dir)))
}

#[test]
fn missing_documents_load_as_defaults() {
    let dir = tempdir().unwrap();
    let st = file_storage(dir.path());
    assert_eq!(st.load_playlists(), PlaylistCollection::default());
    assert_eq!(st.load_settings(), PlayerSettings::default());
    assert_eq!(st.load_resume_state("p1"), ResumeState::default());
    assert_eq!(st.load_peak("A.mp3"), None);
}

#[test]
fn documents_round_trip_through_files_with_expected_keys() {
    let dir = tempdir().unwrap();
    let mut st = file_storage(dir.path());

    st.save_settings(PlayerSettings {
        shuffle: true,
        normalize: false,
    });
    st.save_resume_state(
        "p1",
        ResumeState {
            track_key: Some("A.mp3".into()),
            offset: 42.0,
        },
    );
    st.save_peak("A.mp3", 0.25);

    let raw = std::fs::read_to_string(dir.path().join("playlistStates.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["p1"]["trackKey"], "A.mp3");
    assert_eq!(v["p1"]["offset"], 42.0);

    let raw = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["shuffle"], true);
    assert_eq!(v["normalize"], false);

    let reopened = file_storage(dir.path());
    assert_eq!(reopened.load_peak("A.mp3"), Some(0.25));
    assert_eq!(
        reopened.load_resume_state("p1").track_key.as_deref(),
        Some("A.mp3")
    );
}

#[test]
fn corrupt_json_falls_back_to_default() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("playlists.json"), b"{ not json").unwrap();
    std::fs::write(dir.path().join("normInfo.json"), b"[1, 2").unwrap();

    let mut st = file_storage(dir.path());
    assert_eq!(st.load_playlists(), PlaylistCollection::default());
    assert_eq!(st.load_peak("A.mp3"), None);

    // A save after a corrupt read replaces the document.
    st.save_peak("A.mp3", 0.5);
    assert_eq!(st.load_peak("A.mp3"), Some(0.5));
}

#[test]
fn non_positive_peaks_count_as_unknown() {
    let mut st = Storage::new(Box::new(MemoryBlobStore::new()));
    st.save_peak("zero.mp3", 0.0);
    assert_eq!(st.load_peak("zero.mp3"), None);
}

#[test]
fn remove_resume_state_only_touches_that_playlist() {
    let mut st = Storage::new(Box::new(MemoryBlobStore::new()));
    st.save_resume_state("p1", ResumeState::default());
    st.save_resume_state(
        "p2",
        ResumeState {
            track_key: Some("B.mp3".into()),
            offset: 1.5,
        },
    );
    st.remove_resume_state("p1");
    assert_eq!(st.load_resume_state("p2").offset, 1.5);
}

#[test]
fn clear_caches_drops_peaks_and_resume_states_only() {
    let mut st = Storage::new(Box::new(MemoryBlobStore::new()));
    st.save_peak("A.mp3", 0.3);
    st.save_resume_state(
        "p1",
        ResumeState {
            track_key: Some("A.mp3".into()),
            offset: 3.0,
        },
    );
    st.save_playlists(&PlaylistCollection {
        playlists: vec![Playlist {
            id: "p1".into(),
            name: "One".into(),
            items: vec!["A.mp3".into()],
        }],
        current_playlist_id: Some("p1".into()),
    });

    st.clear_caches();

    assert_eq!(st.load_peak("A.mp3"), None);
    assert_eq!(st.load_resume_state("p1"), ResumeState::default());
    assert_eq!(st.load_playlists().playlists.len(), 1);
}

#[test]
fn unwritable_directory_is_logged_not_fatal() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file-not-dir");
    std::fs::write(&blocker, b"x").unwrap();

    let mut st = file_storage(&blocker);
    st.save_settings(PlayerSettings {
        shuffle: true,
        normalize: true,
    });
    assert_eq!(st.load_settings(), PlayerSettings::default());
}
