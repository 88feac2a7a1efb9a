//! Named playlists of track keys and the current-playlist pointer.

mod model;
mod store;

pub use model::{Playlist, PlaylistCollection};
pub use store::PlaylistStore;

#[cfg(test)]
mod tests;
