//! Audio-related small types shared by the output backends and the engine.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::library::Track;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("no source loaded")]
    NoSource,
}

/// State of the output graph (device stream + gain stage).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum GraphState {
    /// Not built yet; built lazily on the first `play`.
    #[default]
    Uninitialized,
    /// Built but not producing sound (device lost or suspended by the platform).
    Suspended,
    Running,
}

/// Lifecycle notifications from the decoder, delivered asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderEvent {
    /// The source loaded under `token` played to its natural end.
    Ended { token: u64 },
}

/// Sound output: a decoded source feeding a gain stage feeding the device.
///
/// The engine is the only owner. A source is loaded paused; every load carries
/// the play-sequence token that its `Ended` event will echo back.
pub trait AudioOutput {
    /// Build the graph if it does not exist yet.
    fn ensure_graph(&mut self) -> Result<(), AudioError>;
    fn graph_state(&self) -> GraphState;
    /// Bring a suspended graph back to `Running`. Any loaded source is lost.
    fn resume_graph(&mut self) -> Result<(), AudioError>;

    /// Replace the current source with `track`, paused at `offset`.
    fn load(&mut self, track: &Track, offset: Duration, token: u64) -> Result<(), AudioError>;
    fn has_source(&self) -> bool;
    fn unload(&mut self);

    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    /// Playhead of the loaded source.
    fn position(&self) -> Duration;
    /// Length of the loaded source when the container reports it.
    fn duration(&self) -> Option<Duration>;
    fn seek(&mut self, to: Duration) -> Result<(), AudioError>;

    /// Raw source volume; kept at 1.0 so loudness lives in the gain stage.
    fn set_volume(&mut self, volume: f32);
    fn set_gain(&mut self, gain: f32);
    fn gain(&self) -> f32;

    /// Drain pending decoder events.
    fn poll_events(&mut self) -> Vec<DecoderEvent>;
}
