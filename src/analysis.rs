//! Background peak analysis feeding loudness normalization.
//!
//! Jobs are drained one at a time from a FIFO queue and decoded on a worker
//! thread, so analysis never competes with the playback path for the runtime
//! loop.

mod peak;
mod queue;
mod worker;

pub use peak::{DecoderPeakAnalyzer, PeakAnalyzer};
pub use queue::{AnalysisJob, AnalysisQueue};
pub use worker::{AnalysisResult, PeakWorker, ThreadedPeakWorker};
