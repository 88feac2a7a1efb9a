//! The playback engine and the queue rules it follows.

mod engine;
mod events;
mod navigator;
mod state;

pub use engine::{LoadReport, Player, PlayerParts, Tuning};
pub use events::PlayerEvent;
pub use navigator::{active_queue, next_position, prev_position};
pub use state::{PlaybackState, PlaybackStatus};
