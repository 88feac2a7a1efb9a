//! OS media-control surface.
//!
//! The engine pushes now-playing metadata, status and position through
//! `MediaControls`; the platform side sends `ControlCmd`s back over a channel.
//! When no platform integration is available `NoopControls` stands in.

use std::time::Duration;

use crate::player::PlaybackStatus;

/// Transport commands from media keys, MPRIS clients or the terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in seconds; negative moves backwards.
    SeekBy(f64),
    /// Absolute seek in seconds.
    SeekTo(f64),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub length: Option<Duration>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionState {
    pub position: Duration,
    pub duration: Option<Duration>,
    pub rate: f64,
}

pub trait MediaControls {
    fn set_now_playing(&mut self, now: Option<NowPlaying>);
    fn set_status(&mut self, status: PlaybackStatus);
    fn set_position(&mut self, position: PositionState);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopControls;

impl MediaControls for NoopControls {
    fn set_now_playing(&mut self, _now: Option<NowPlaying>) {}
    fn set_status(&mut self, _status: PlaybackStatus) {}
    fn set_position(&mut self, _position: PositionState) {}
}
