use std::time::{SystemTime, UNIX_EPOCH};

use crate::storage::Storage;

use super::model::{Playlist, PlaylistCollection};

/// Owner of the playlist collection. Every mutation is written back through
/// `Storage::save_playlists` before returning.
#[derive(Debug, Default)]
pub struct PlaylistStore {
    collection: PlaylistCollection,
}

impl PlaylistStore {
    pub fn new(collection: PlaylistCollection) -> Self {
        let mut store = Self { collection };
        store.repair_current();
        store
    }

    pub fn load(storage: &Storage) -> Self {
        Self::new(storage.load_playlists())
    }

    /// A current id that names no playlist falls back to the first one.
    fn repair_current(&mut self) {
        let valid = self
            .collection
            .current_playlist_id
            .as_deref()
            .is_some_and(|id| self.collection.find(id).is_some());
        if !valid {
            self.collection.current_playlist_id =
                self.collection.playlists.first().map(|p| p.id.clone());
        }
    }

    pub fn collection(&self) -> &PlaylistCollection {
        &self.collection
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.collection.playlists
    }

    pub fn get(&self, id: &str) -> Option<&Playlist> {
        self.collection.find(id)
    }

    pub fn current(&self) -> Option<&Playlist> {
        self.collection.current()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.collection.current_playlist_id.as_deref()
    }

    fn generate_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        loop {
            let id = format!("{millis}{:x}", rand::random::<u32>());
            if self.collection.find(&id).is_none() {
                return id;
            }
        }
    }

    /// Create an empty playlist and make it current. Returns its id.
    pub fn create(&mut self, name: &str, storage: &mut Storage) -> String {
        let name = match name.trim() {
            "" => format!("Playlist {}", self.collection.playlists.len() + 1),
            n => n.to_string(),
        };
        let id = self.generate_id();
        self.collection.playlists.push(Playlist {
            id: id.clone(),
            name,
            items: Vec::new(),
        });
        self.collection.current_playlist_id = Some(id.clone());
        storage.save_playlists(&self.collection);
        id
    }

    /// Rename `id`. Blank names are ignored. Returns whether anything changed.
    pub fn rename(&mut self, id: &str, name: &str, storage: &mut Storage) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(p) = self.collection.find_mut(id) else {
            log::warn!("playlists: rename of unknown playlist {id}");
            return false;
        };
        p.name = name.to_string();
        storage.save_playlists(&self.collection);
        true
    }

    /// Remove `id` and its resume point. When it was current, the first
    /// remaining playlist (or none) becomes current. Returns whether `id`
    /// was the current playlist.
    pub fn delete(&mut self, id: &str, storage: &mut Storage) -> bool {
        let Some(pos) = self.collection.playlists.iter().position(|p| p.id == id) else {
            log::warn!("playlists: delete of unknown playlist {id}");
            return false;
        };
        self.collection.playlists.remove(pos);
        storage.remove_resume_state(id);

        let was_current = self.current_id() == Some(id);
        if was_current {
            self.collection.current_playlist_id =
                self.collection.playlists.first().map(|p| p.id.clone());
        }
        storage.save_playlists(&self.collection);
        was_current
    }

    /// Append `key` unless the playlist already holds it.
    pub fn add_track(&mut self, id: &str, key: &str, storage: &mut Storage) -> bool {
        let Some(p) = self.collection.find_mut(id) else {
            log::warn!("playlists: add to unknown playlist {id}");
            return false;
        };
        if p.items.iter().any(|k| k == key) {
            return false;
        }
        p.items.push(key.to_string());
        storage.save_playlists(&self.collection);
        true
    }

    /// Append every key not yet present. Returns the keys actually added.
    pub fn add_keys<'a>(
        &mut self,
        id: &str,
        keys: impl IntoIterator<Item = &'a str>,
        storage: &mut Storage,
    ) -> Vec<String> {
        let Some(p) = self.collection.find_mut(id) else {
            return Vec::new();
        };
        let mut added = Vec::new();
        for key in keys {
            if !p.items.iter().any(|k| k == key) {
                p.items.push(key.to_string());
                added.push(key.to_string());
            }
        }
        if !added.is_empty() {
            storage.save_playlists(&self.collection);
        }
        added
    }

    /// Remove the item at `item_index`. Returns the removed key.
    pub fn remove_track_at(
        &mut self,
        id: &str,
        item_index: usize,
        storage: &mut Storage,
    ) -> Option<String> {
        let p = self.collection.find_mut(id)?;
        if item_index >= p.items.len() {
            log::warn!("playlists: no item {item_index} in {id}");
            return None;
        }
        let key = p.items.remove(item_index);
        storage.save_playlists(&self.collection);
        Some(key)
    }

    /// Move the current pointer. Unknown ids are ignored.
    pub fn select(&mut self, id: &str, storage: &mut Storage) -> bool {
        if self.collection.find(id).is_none() {
            log::warn!("playlists: select of unknown playlist {id}");
            return false;
        }
        self.collection.current_playlist_id = Some(id.to_string());
        storage.save_playlists(&self.collection);
        true
    }

    /// Make sure at least one playlist exists and that the first is current.
    /// Returns the current id.
    pub fn ensure_default(&mut self, storage: &mut Storage) -> String {
        if self.collection.playlists.is_empty() {
            return self.create("Playlist 1", storage);
        }
        let first = self.collection.playlists[0].id.clone();
        self.collection.current_playlist_id = Some(first.clone());
        storage.save_playlists(&self.collection);
        first
    }
}
