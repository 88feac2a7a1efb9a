use super::*;
use crate::storage::{MemoryBlobStore, ResumeState, Storage};
use proptest::prelude::*;

fn storage() -> Storage {
    Storage::new(Box::new(MemoryBlobStore::new()))
}

#[test]
fn create_makes_new_playlist_current_and_persists() {
    let mut st = storage();
    let mut store = PlaylistStore::default();

    let a = store.create("Road trip", &mut st);
    let b = store.create("  ", &mut st);

    assert_ne!(a, b);
    assert_eq!(store.current_id(), Some(b.as_str()));
    assert_eq!(store.get(&b).unwrap().name, "Playlist 2");
    assert_eq!(st.load_playlists(), store.collection().clone());
}

#[test]
fn rename_trims_and_ignores_blank_names() {
    let mut st = storage();
    let mut store = PlaylistStore::default();
    let id = store.create("Old", &mut st);

    assert!(store.rename(&id, "  New  ", &mut st));
    assert!(!store.rename(&id, "   ", &mut st));
    assert!(!store.rename("nope", "X", &mut st));
    assert_eq!(st.load_playlists().find(&id).unwrap().name, "New");
}

#[test]
fn add_track_is_idempotent() {
    let mut st = storage();
    let mut store = PlaylistStore::default();
    let id = store.create("P", &mut st);

    assert!(store.add_track(&id, "A.mp3", &mut st));
    assert!(!store.add_track(&id, "A.mp3", &mut st));
    assert!(store.add_track(&id, "B.mp3", &mut st));
    assert_eq!(store.get(&id).unwrap().items, vec!["A.mp3", "B.mp3"]);

    let added = store.add_keys(&id, ["B.mp3", "C.mp3", "A.mp3", "D.mp3"], &mut st);
    assert_eq!(added, vec!["C.mp3", "D.mp3"]);
    assert_eq!(st.load_playlists().find(&id).unwrap().items.len(), 4);
}

#[test]
fn remove_track_at_out_of_range_is_ignored() {
    let mut st = storage();
    let mut store = PlaylistStore::default();
    let id = store.create("P", &mut st);
    store.add_track(&id, "A.mp3", &mut st);

    assert_eq!(store.remove_track_at(&id, 3, &mut st), None);
    assert_eq!(store.remove_track_at(&id, 0, &mut st).as_deref(), Some("A.mp3"));
    assert!(store.get(&id).unwrap().items.is_empty());
}

#[test]
fn delete_current_moves_to_first_remaining_and_drops_resume_state() {
    let mut st = storage();
    let mut store = PlaylistStore::default();
    let first = store.create("One", &mut st);
    let second = store.create("Two", &mut st);
    st.save_resume_state(
        &second,
        ResumeState {
            track_key: Some("A.mp3".into()),
            offset: 12.0,
        },
    );

    assert!(store.delete(&second, &mut st));
    assert_eq!(store.current_id(), Some(first.as_str()));
    assert_eq!(st.load_resume_state(&second), ResumeState::default());

    assert!(store.delete(&first, &mut st));
    assert_eq!(store.current_id(), None);
    assert!(st.load_playlists().playlists.is_empty());
}

#[test]
fn delete_non_current_keeps_pointer() {
    let mut st = storage();
    let mut store = PlaylistStore::default();
    let first = store.create("One", &mut st);
    let second = store.create("Two", &mut st);

    assert!(!store.delete(&first, &mut st));
    assert_eq!(store.current_id(), Some(second.as_str()));
}

#[test]
fn load_repairs_dangling_current_id() {
    let collection = PlaylistCollection {
        playlists: vec![Playlist {
            id: "p1".into(),
            name: "One".into(),
            items: vec![],
        }],
        current_playlist_id: Some("gone".into()),
    };
    let store = PlaylistStore::new(collection);
    assert_eq!(store.current_id(), Some("p1"));
}

#[test]
fn ensure_default_creates_first_playlist() {
    let mut st = storage();
    let mut store = PlaylistStore::default();
    let id = store.ensure_default(&mut st);
    assert_eq!(store.get(&id).unwrap().name, "Playlist 1");
    assert_eq!(store.ensure_default(&mut st), id);
}

#[test]
fn collection_serializes_with_camel_case_current_id() {
    let collection = PlaylistCollection {
        playlists: vec![Playlist {
            id: "p1".into(),
            name: "One".into(),
            items: vec!["A.mp3".into()],
        }],
        current_playlist_id: Some("p1".into()),
    };
    let json = serde_json::to_value(&collection).unwrap();
    assert_eq!(json["currentPlaylistId"], "p1");
    assert_eq!(json["playlists"][0]["items"][0], "A.mp3");
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::Add),
        (0usize..64).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn items_track_adds_minus_removes_in_order(ops in proptest::collection::vec(op(), 0..64)) {
        let mut st = storage();
        let mut store = PlaylistStore::default();
        let id = store.create("P", &mut st);
        let mut model: Vec<String> = Vec::new();
        let mut adds = 0usize;
        let mut removes = 0usize;
        let mut next_key = 0u32;

        for op in ops {
            match op {
                Op::Add(tag) => {
                    // Unique keys so every add lands.
                    let key = format!("{tag}-{next_key}.mp3");
                    next_key += 1;
                    prop_assert!(store.add_track(&id, &key, &mut st));
                    model.push(key);
                    adds += 1;
                }
                Op::Remove(i) => {
                    let removed = store.remove_track_at(&id, i, &mut st);
                    if i < model.len() {
                        prop_assert_eq!(removed, Some(model.remove(i)));
                        removes += 1;
                    } else {
                        prop_assert_eq!(removed, None);
                    }
                }
            }
        }

        let items = &store.get(&id).unwrap().items;
        prop_assert_eq!(items.len(), adds - removes);
        prop_assert_eq!(items, &model);
    }
}
