use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::playlists::PlaylistCollection;

use super::blob::{BlobStore, StorageError};

pub const PLAYLISTS_KEY: &str = "playlists";
pub const SETTINGS_KEY: &str = "settings";
pub const RESUME_STATES_KEY: &str = "playlistStates";
pub const NORM_INFO_KEY: &str = "normInfo";

/// Persisted player toggles (process-wide).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub shuffle: bool,
    pub normalize: bool,
}

/// Last known position inside a playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeState {
    pub track_key: Option<String>,
    pub offset: f64,
}

pub type ResumeStates = BTreeMap<String, ResumeState>;
pub type NormInfo = BTreeMap<String, f32>;

/// Typed access to the persisted documents.
///
/// Every read falls back to an empty default when the blob is missing or
/// unreadable, and every write failure is logged and dropped: storage trouble
/// never interrupts playback.
pub struct Storage {
    blobs: Box<dyn BlobStore>,
}

impl Storage {
    pub fn new(blobs: Box<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.blobs.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.try_read(key) {
            Ok(v) => v.unwrap_or_default(),
            Err(e) => {
                log::error!("storage: failed to load `{key}`: {e}");
                T::default()
            }
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
            .and_then(|raw| self.blobs.set(key, &raw));
        if let Err(e) = result {
            log::error!("storage: failed to save `{key}`: {e}");
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.blobs.remove(key) {
            log::error!("storage: failed to remove `{key}`: {e}");
        }
    }

    pub fn load_playlists(&self) -> PlaylistCollection {
        self.read(PLAYLISTS_KEY)
    }

    pub fn save_playlists(&mut self, collection: &PlaylistCollection) {
        self.write(PLAYLISTS_KEY, collection);
    }

    pub fn load_settings(&self) -> PlayerSettings {
        self.read(SETTINGS_KEY)
    }

    pub fn save_settings(&mut self, settings: PlayerSettings) {
        self.write(SETTINGS_KEY, &settings);
    }

    pub fn load_resume_state(&self, playlist_id: &str) -> ResumeState {
        let mut all: ResumeStates = self.read(RESUME_STATES_KEY);
        all.remove(playlist_id).unwrap_or_default()
    }

    pub fn save_resume_state(&mut self, playlist_id: &str, state: ResumeState) {
        let mut all: ResumeStates = self.read(RESUME_STATES_KEY);
        all.insert(playlist_id.to_string(), state);
        self.write(RESUME_STATES_KEY, &all);
    }

    pub fn remove_resume_state(&mut self, playlist_id: &str) {
        let mut all: ResumeStates = self.read(RESUME_STATES_KEY);
        if all.remove(playlist_id).is_some() {
            self.write(RESUME_STATES_KEY, &all);
        }
    }

    /// Cached peak for `track_key`. Non-positive values count as unknown.
    pub fn load_peak(&self, track_key: &str) -> Option<f32> {
        let all: NormInfo = self.read(NORM_INFO_KEY);
        all.get(track_key).copied().filter(|p| *p > 0.0)
    }

    pub fn save_peak(&mut self, track_key: &str, peak: f32) {
        let mut all: NormInfo = self.read(NORM_INFO_KEY);
        all.insert(track_key.to_string(), peak);
        self.write(NORM_INFO_KEY, &all);
    }

    /// Drop the normalization cache and every playlist resume point.
    pub fn clear_caches(&mut self) {
        self.remove(NORM_INFO_KEY);
        self.remove(RESUME_STATES_KEY);
    }
}
