use serde::{Deserialize, Serialize};

/// A named, ordered list of track keys. Items may name tracks that are not
/// loaded in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Every playlist plus the current selection; persisted as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaylistCollection {
    pub playlists: Vec<Playlist>,
    pub current_playlist_id: Option<String>,
}

impl PlaylistCollection {
    pub fn find(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub(super) fn find_mut(&mut self, id: &str) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| p.id == id)
    }

    pub fn current(&self) -> Option<&Playlist> {
        self.current_playlist_id
            .as_deref()
            .and_then(|id| self.find(id))
    }
}
