use std::collections::HashMap;

use crate::library::{Track, display_name};

use super::TrackMetadata;
use super::id3::parse_id3v2;

/// Per-session memo of parsed tags, keyed by track key.
///
/// Never invalidated: file content for a key is assumed stable while the
/// process runs.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<String, TrackMetadata>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return metadata for `track`, reading its file on first use.
    pub fn extract(&mut self, track: &Track) -> &TrackMetadata {
        self.entries
            .entry(track.key.clone())
            .or_insert_with(|| match std::fs::read(&track.path) {
                Ok(bytes) => parse_id3v2(&bytes),
                Err(e) => {
                    log::warn!("metadata: failed to read {:?}: {e}", track.path);
                    TrackMetadata::default()
                }
            })
    }

    /// Cached metadata without touching the filesystem.
    pub fn get(&self, key: &str) -> Option<&TrackMetadata> {
        self.entries.get(key)
    }

    /// Human label for a track: "Title - Artist", falling back to the file stem.
    pub fn label(&mut self, track: &Track) -> String {
        let meta = self.extract(track);
        display_title(&track.key, meta)
    }
}

pub fn display_title(key: &str, meta: &TrackMetadata) -> String {
    let title = meta.title.as_deref().unwrap_or_else(|| display_name(key));
    match meta.artist.as_deref() {
        Some(artist) => format!("{title} - {artist}"),
        None => title.to_string(),
    }
}
