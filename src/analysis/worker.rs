use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::peak::PeakAnalyzer;
use super::queue::AnalysisJob;

/// Outcome of one job, posted back to the runtime loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub key: String,
    pub peak: Option<f32>,
}

/// Runs analysis jobs somewhere off the playback path.
pub trait PeakWorker {
    /// Hand `job` over. `false` means it was dropped and no result will come.
    fn submit(&mut self, job: AnalysisJob) -> bool;
}

/// A dedicated thread that decodes jobs in submission order.
pub struct ThreadedPeakWorker {
    jobs: Sender<AnalysisJob>,
    _handle: JoinHandle<()>,
}

impl ThreadedPeakWorker {
    pub fn spawn<A>(analyzer: A, results: Sender<AnalysisResult>) -> Self
    where
        A: PeakAnalyzer + Send + 'static,
    {
        let (jobs, rx) = mpsc::channel::<AnalysisJob>();
        let handle = thread::spawn(move || run_worker(analyzer, rx, results));
        Self {
            jobs,
            _handle: handle,
        }
    }
}

fn run_worker<A: PeakAnalyzer>(analyzer: A, rx: Receiver<AnalysisJob>, results: Sender<AnalysisResult>) {
    // Ends when the engine drops its sender or the runtime stops listening.
    while let Ok(job) = rx.recv() {
        log::debug!("analysis: decoding {:?}", job.track.path);
        let peak = analyzer.analyze(&job.track);
        if results.send(AnalysisResult { key: job.key, peak }).is_err() {
            break;
        }
    }
}

impl PeakWorker for ThreadedPeakWorker {
    fn submit(&mut self, job: AnalysisJob) -> bool {
        match self.jobs.send(job) {
            Ok(()) => true,
            Err(e) => {
                log::error!("analysis: worker is gone, dropping {:?}", e.0.key);
                false
            }
        }
    }
}
