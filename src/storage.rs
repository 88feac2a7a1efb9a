//! Persistence: whole JSON documents in a string-keyed blob store.
//!
//! Four documents are kept: `playlists`, `settings`, `playlistStates`
//! (resume points per playlist id) and `normInfo` (peak per track key).

mod blob;
mod documents;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore, StorageError};
pub use documents::*;

#[cfg(test)]
mod tests;
