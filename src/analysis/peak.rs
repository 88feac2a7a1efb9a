use std::fs::File;
use std::io::BufReader;

use rodio::Decoder;

use crate::library::Track;

/// Measures the loudest sample of a track.
pub trait PeakAnalyzer {
    /// Maximum absolute sample in [0, 1], or `None` when the file cannot be
    /// decoded.
    fn analyze(&self, track: &Track) -> Option<f32>;
}

/// Decodes the whole file through rodio and scans every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecoderPeakAnalyzer;

impl PeakAnalyzer for DecoderPeakAnalyzer {
    fn analyze(&self, track: &Track) -> Option<f32> {
        let file = match File::open(&track.path) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("analysis: cannot open {:?}: {e}", track.path);
                return None;
            }
        };
        let decoder = match Decoder::new(BufReader::new(file)) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("analysis: cannot decode {:?}: {e}", track.path);
                return None;
            }
        };

        // Samples of every channel are interleaved, so one pass covers them all.
        let peak = decoder.fold(0.0f32, |max, s| max.max(s.abs()));
        Some(peak.clamp(0.0, 1.0))
    }
}
