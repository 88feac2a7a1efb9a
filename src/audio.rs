//! Audio output: the decoded source, the gain stage and the device stream.
//!
//! `AudioOutput` is the seam the playback engine drives; `RodioOutput` is the
//! real backend.

mod gain;
mod output;
mod sink;
mod types;

pub use gain::normalization_gain;
pub use output::RodioOutput;
pub use types::*;

#[cfg(test)]
mod tests;
