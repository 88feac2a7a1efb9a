use crate::audio::DecoderEvent;
use crate::controls::ControlCmd;

/// Everything that can move the engine, funneled through `Player::handle`.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// Media keys, MPRIS or the terminal transport keys.
    Transport(ControlCmd),
    Decoder(DecoderEvent),
    /// A background peak measurement came back.
    AnalysisFinished { key: String, peak: Option<f32> },
    /// Terminal focus changed; `hidden` is true when focus was lost.
    Visibility { hidden: bool },
}
