use std::fs;
use std::sync::mpsc::Sender;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::analysis::{AnalysisResult, DecoderPeakAnalyzer, ThreadedPeakWorker};
use crate::audio::RodioOutput;
use crate::config;
use crate::controls::{ControlCmd, MediaControls, NoopControls};
use crate::player::{Player, PlayerParts, Tuning};
use crate::storage::{BlobStore, FileBlobStore, MemoryBlobStore, Storage};

/// Persisted state goes under `storage.dir` (or the XDG data dir). When that
/// directory is unusable the session still runs, it just forgets on exit.
fn open_storage(settings: &config::StorageSettings) -> Storage {
    let dir = settings.dir.clone().or_else(config::default_data_dir);
    let blobs: Box<dyn BlobStore> = match dir {
        Some(dir) => match fs::create_dir_all(&dir) {
            Ok(()) => {
                log::info!("storage: using {}", dir.display());
                Box::new(FileBlobStore::new(dir))
            }
            Err(e) => {
                log::warn!(
                    "storage: cannot create {}: {e}; state will not persist",
                    dir.display()
                );
                Box::new(MemoryBlobStore::new())
            }
        },
        None => {
            log::warn!("storage: no data directory; state will not persist");
            Box::new(MemoryBlobStore::new())
        }
    };
    Storage::new(blobs)
}

fn media_controls(
    settings: &config::ControlsSettings,
    control_tx: Sender<ControlCmd>,
) -> Box<dyn MediaControls> {
    if !settings.mpris {
        log::info!("mpris: disabled by config");
        return Box::new(NoopControls);
    }
    match crate::mpris::spawn_mpris(control_tx) {
        Ok(controls) => Box::new(controls),
        Err(e) => {
            log::warn!("mpris: unavailable, continuing without media keys: {e}");
            Box::new(NoopControls)
        }
    }
}

/// Wire the engine to the real output device, media controls, analysis
/// thread and on-disk storage.
pub fn build_player(
    settings: &config::Settings,
    control_tx: Sender<ControlCmd>,
    analysis_tx: Sender<AnalysisResult>,
) -> Player {
    Player::new(PlayerParts {
        storage: open_storage(&settings.storage),
        output: Box::new(RodioOutput::new()),
        controls: media_controls(&settings.controls, control_tx),
        worker: Box::new(ThreadedPeakWorker::spawn(DecoderPeakAnalyzer, analysis_tx)),
        rng: StdRng::from_entropy(),
        tuning: Tuning::from_settings(settings),
    })
}
