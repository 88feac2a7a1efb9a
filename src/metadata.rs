//! Title/artist extraction from local files.

mod cache;
mod id3;

pub use cache::{MetadataCache, display_title};
pub use id3::parse_id3v2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
}

#[cfg(test)]
mod tests;
