use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::library::Track;

use super::sink::create_sink_at;
use super::types::{AudioError, AudioOutput, DecoderEvent, GraphState};

struct Loaded {
    sink: Sink,
    track: Track,
    token: u64,
    /// Where `sink` started inside the file; `Sink::get_pos` counts from here.
    base: Duration,
    duration: Option<Duration>,
    ended_reported: bool,
}

/// `AudioOutput` on the default device through rodio.
///
/// The sink volume plays the role of the gain stage: it is set to
/// `volume * gain`, so changing the gain never touches the playhead.
pub struct RodioOutput {
    stream: Option<OutputStream>,
    loaded: Option<Loaded>,
    volume: f32,
    gain: f32,
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl RodioOutput {
    pub fn new() -> Self {
        Self {
            stream: None,
            loaded: None,
            volume: 1.0,
            gain: 1.0,
        }
    }

    fn apply_level(&self) {
        if let Some(l) = &self.loaded {
            l.sink.set_volume(self.volume * self.gain);
        }
    }
}

impl AudioOutput for RodioOutput {
    fn ensure_graph(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::NoDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        log::info!("audio: output stream opened");
        self.stream = Some(stream);
        Ok(())
    }

    fn graph_state(&self) -> GraphState {
        if self.stream.is_some() {
            GraphState::Running
        } else {
            GraphState::Uninitialized
        }
    }

    fn resume_graph(&mut self) -> Result<(), AudioError> {
        // A rodio stream never suspends on its own; reopening is the only remedy.
        if self.stream.is_none() {
            self.loaded = None;
        }
        self.ensure_graph()
    }

    fn load(&mut self, track: &Track, offset: Duration, token: u64) -> Result<(), AudioError> {
        self.unload();
        self.ensure_graph()?;
        let Some(stream) = self.stream.as_ref() else {
            return Err(AudioError::NoDevice("stream unavailable".to_string()));
        };
        let (sink, duration) = create_sink_at(stream, track, offset)?;
        self.loaded = Some(Loaded {
            sink,
            track: track.clone(),
            token,
            base: offset,
            duration: duration.or(track.duration),
            ended_reported: false,
        });
        self.apply_level();
        Ok(())
    }

    fn has_source(&self) -> bool {
        self.loaded.is_some()
    }

    fn unload(&mut self) {
        if let Some(l) = self.loaded.take() {
            l.sink.stop();
        }
    }

    fn play(&mut self) {
        if let Some(l) = &self.loaded {
            l.sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(l) = &self.loaded {
            l.sink.pause();
        }
    }

    fn is_paused(&self) -> bool {
        self.loaded.as_ref().is_none_or(|l| l.sink.is_paused())
    }

    fn position(&self) -> Duration {
        self.loaded
            .as_ref()
            .map(|l| l.base + l.sink.get_pos())
            .unwrap_or_default()
    }

    fn duration(&self) -> Option<Duration> {
        self.loaded.as_ref().and_then(|l| l.duration)
    }

    fn seek(&mut self, to: Duration) -> Result<(), AudioError> {
        // Scrubbing: rebuild the current sink and skip into the file.
        let Some(l) = self.loaded.as_ref() else {
            return Err(AudioError::NoSource);
        };
        let Some(stream) = self.stream.as_ref() else {
            return Err(AudioError::NoSource);
        };
        let paused = l.sink.is_paused();
        let (sink, _) = create_sink_at(stream, &l.track, to)?;
        if !paused {
            sink.play();
        }

        if let Some(old) = self.loaded.as_mut() {
            old.sink.stop();
            old.sink = sink;
            old.base = to;
            old.ended_reported = false;
        }
        self.apply_level();
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.apply_level();
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        self.apply_level();
    }

    fn gain(&self) -> f32 {
        self.gain
    }

    fn poll_events(&mut self) -> Vec<DecoderEvent> {
        let mut events = Vec::new();
        if let Some(l) = self.loaded.as_mut() {
            if !l.ended_reported && !l.sink.is_paused() && l.sink.empty() {
                l.ended_reported = true;
                events.push(DecoderEvent::Ended { token: l.token });
            }
        }
        events
    }
}
