use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A local audio file opened during this session.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// File name including extension; correlates playlists, peaks and resume points.
    pub key: String,
    pub path: PathBuf,
    pub duration: Option<Duration>,
}

impl Track {
    pub fn from_path(path: &Path, duration: Option<Duration>) -> Self {
        Self {
            key: track_key(path),
            path: path.to_path_buf(),
            duration,
        }
    }
}

/// Derive the track key from a path: its file name, or an empty string.
pub fn track_key(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Strip the last extension from a key for display purposes.
pub fn display_name(key: &str) -> &str {
    match key.rfind('.') {
        Some(dot) if dot > 0 => &key[..dot],
        _ => key,
    }
}

/// Tracks loaded this session, in load order, plus the key lookup.
///
/// Keys are file names and may collide when two folders hold files with the
/// same name. The lookup is last-write-wins: a later track shadows an earlier
/// one for every key-based operation (playlists, peaks, resume points). The
/// shadowed track stays in the list and can still be started by index.
/// `append` reports every key that became shadowed so callers can surface it.
#[derive(Debug, Default)]
pub struct Library {
    tracks: Vec<Track>,
    index_by_key: HashMap<String, usize>,
}

impl Library {
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut lib = Self::default();
        lib.append(tracks);
        lib
    }

    /// Append `tracks` and rebuild the lookup. Returns keys that now shadow
    /// an earlier track.
    pub fn append(&mut self, tracks: Vec<Track>) -> Vec<String> {
        self.tracks.extend(tracks);
        self.rebuild_index()
    }

    fn rebuild_index(&mut self) -> Vec<String> {
        let mut shadowed = Vec::new();
        self.index_by_key.clear();
        for (i, track) in self.tracks.iter().enumerate() {
            if let Some(prev) = self.index_by_key.insert(track.key.clone(), i) {
                log::warn!(
                    "library: {:?} shadows {:?} (same key {:?})",
                    track.path,
                    self.tracks[prev].path,
                    track.key
                );
                if !shadowed.contains(&track.key) {
                    shadowed.push(track.key.clone());
                }
            }
        }
        shadowed
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_by_key.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index_by_key.contains_key(key)
    }

    pub fn by_key(&self, key: &str) -> Option<&Track> {
        self.index_of(key).and_then(|i| self.tracks.get(i))
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.tracks.get(index).map(|t| t.key.as_str())
    }
}
