/// Coarse playback status shared with the UI and media controls.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The single "now playing" record.
///
/// `play_sequence` is bumped on every fresh load. Decoder events carry the
/// value they were loaded under, and only the matching one is acted upon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    /// Seconds into the current track.
    pub offset: f64,
    pub status: PlaybackStatus,
    pub play_sequence: u64,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}
