use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;

use crate::analysis::{AnalysisQueue, PeakWorker};
use crate::audio::{AudioOutput, DecoderEvent, GraphState, normalization_gain};
use crate::config::{self, LibrarySettings};
use crate::controls::{ControlCmd, MediaControls, NowPlaying, PositionState};
use crate::library::{self, Library, Track, display_name};
use crate::metadata::MetadataCache;
use crate::playlists::{Playlist, PlaylistStore};
use crate::storage::{PlayerSettings, ResumeState, Storage};

use super::events::PlayerEvent;
use super::navigator::{active_queue, next_position, prev_position};
use super::state::{PlaybackState, PlaybackStatus};

/// Playheads closer than this count as the same position.
const SEEK_TOLERANCE: Duration = Duration::from_millis(50);

/// Numeric knobs of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub normalize_target: f32,
    pub normalize_max_gain: f32,
    pub media_sync_interval: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_settings(&config::Settings::default())
    }
}

impl Tuning {
    pub fn from_settings(settings: &config::Settings) -> Self {
        Self {
            normalize_target: settings.audio.normalize_target,
            normalize_max_gain: settings.audio.normalize_max_gain,
            media_sync_interval: Duration::from_millis(settings.controls.media_sync_interval_ms),
        }
    }
}

/// Collaborators handed to `Player::new`.
pub struct PlayerParts {
    pub storage: Storage,
    pub output: Box<dyn AudioOutput>,
    pub controls: Box<dyn MediaControls>,
    pub worker: Box<dyn PeakWorker>,
    pub rng: StdRng,
    pub tuning: Tuning,
}

/// What a library load did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub added: usize,
    /// Keys whose earlier track is now shadowed by a newly loaded one.
    pub shadowed: Vec<String>,
}

/// The playback engine.
///
/// Owns the library, the now-playing state and the audio output, and is the
/// only place that changes them. UI actions, media keys, decoder events and
/// analysis results all arrive through the methods below (or `handle`) on the
/// runtime thread, so every transition is applied in order.
pub struct Player {
    library: Library,
    state: PlaybackState,
    playlists: PlaylistStore,
    storage: Storage,
    metadata: MetadataCache,
    analysis: AnalysisQueue,
    output: Box<dyn AudioOutput>,
    controls: Box<dyn MediaControls>,
    worker: Box<dyn PeakWorker>,
    rng: StdRng,
    tuning: Tuning,
    shuffle: bool,
    normalize: bool,
    last_media_sync: Option<Instant>,
    quit_requested: bool,
}

impl Player {
    /// Build the engine and pick up persisted playlists and toggles.
    pub fn new(parts: PlayerParts) -> Self {
        let PlayerParts {
            storage,
            output,
            controls,
            worker,
            rng,
            tuning,
        } = parts;
        let playlists = PlaylistStore::load(&storage);
        let PlayerSettings { shuffle, normalize } = storage.load_settings();

        let mut player = Self {
            library: Library::default(),
            state: PlaybackState::default(),
            playlists,
            storage,
            metadata: MetadataCache::new(),
            analysis: AnalysisQueue::new(),
            output,
            controls,
            worker,
            rng,
            tuning,
            shuffle,
            normalize,
            last_media_sync: None,
            quit_requested: false,
        };
        player.controls.set_status(PlaybackStatus::Stopped);
        player.controls.set_now_playing(None);
        player
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playlists(&self) -> &PlaylistStore {
        &self.playlists
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Multiplier currently applied by the gain stage.
    pub fn gain(&self) -> f32 {
        self.output.gain()
    }

    pub fn analysis(&self) -> &AnalysisQueue {
        &self.analysis
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.library.get(self.state.current_index)
    }

    pub fn current_key(&self) -> Option<&str> {
        self.library.key_at(self.state.current_index)
    }

    /// Playhead in seconds: live from the output while a source is loaded.
    pub fn position(&self) -> f64 {
        if self.output.has_source() {
            self.output.position().as_secs_f64()
        } else {
            self.state.offset
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.output
            .duration()
            .or_else(|| self.current_track().and_then(|t| t.duration))
    }

    /// "Title - Artist" for the track at `index`, reading tags on first use.
    pub fn label(&mut self, index: usize) -> Option<String> {
        let track = self.library.get(index)?;
        Some(self.metadata.label(track))
    }

    /// Library indices `next`/`prev` walk over.
    pub fn active_queue(&self) -> Vec<usize> {
        active_queue(&self.library, self.playlists.current())
    }

    pub fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Transport(cmd) => self.transport(cmd),
            PlayerEvent::Decoder(DecoderEvent::Ended { token }) => self.on_ended(token),
            PlayerEvent::AnalysisFinished { key, peak } => self.on_analysis_finished(&key, peak),
            PlayerEvent::Visibility { hidden } => self.on_visibility(hidden),
        }
    }

    /// Drain decoder events from the output and apply them.
    pub fn poll_output(&mut self) {
        for event in self.output.poll_events() {
            self.handle(PlayerEvent::Decoder(event));
        }
    }

    // ---- transport -------------------------------------------------------

    /// Play the library track at `index` from the top.
    pub fn start(&mut self, index: usize) {
        if index >= self.library.len() {
            log::warn!(
                "player: start({index}) out of range (library has {})",
                self.library.len()
            );
            return;
        }
        self.state.current_index = index;
        self.state.offset = 0.0;
        self.stop();
        self.play();
    }

    /// Start `index`, or toggle it when it is already the current track.
    pub fn activate(&mut self, index: usize) {
        if index == self.state.current_index && self.state.status != PlaybackStatus::Stopped {
            self.toggle();
        } else {
            self.start(index);
        }
    }

    pub fn play(&mut self) {
        if self.state.is_playing() {
            log::debug!("player: play while already playing");
            return;
        }
        if let Err(e) = self.prepare_graph() {
            log::error!("player: audio output unavailable: {e}");
            return;
        }
        let Some(track) = self.current_track().cloned() else {
            log::warn!("player: no track at index {}", self.state.current_index);
            return;
        };
        let offset = secs_to_duration(self.state.offset);

        let fresh = !(self.state.status == PlaybackStatus::Paused && self.output.has_source());
        let loaded = if fresh {
            self.state.play_sequence += 1;
            self.output.load(&track, offset, self.state.play_sequence)
        } else if self.output.position().abs_diff(offset) > SEEK_TOLERANCE {
            self.output.seek(offset)
        } else {
            Ok(())
        };
        if let Err(e) = loaded {
            log::error!("player: cannot play {:?}: {e}", track.path);
            self.output.unload();
            self.state.status = PlaybackStatus::Stopped;
            self.controls.set_status(PlaybackStatus::Stopped);
            return;
        }

        self.output.set_volume(1.0);
        self.apply_gain();
        self.output.play();
        self.state.status = PlaybackStatus::Playing;
        if fresh {
            self.push_now_playing();
        }
        self.push_media_state();
    }

    /// Pause and remember where. Does nothing unless playing.
    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            log::debug!("player: pause while not playing");
            return;
        }
        self.state.offset = self.output.position().as_secs_f64();
        self.output.pause();
        self.state.status = PlaybackStatus::Paused;
        self.save_resume_state();
        self.push_media_state();
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else if self.current_track().is_some() {
            self.play();
        }
    }

    /// Drop the loaded source. The offset is kept.
    pub fn stop(&mut self) {
        self.output.unload();
        self.state.status = PlaybackStatus::Stopped;
        self.controls.set_status(PlaybackStatus::Stopped);
    }

    pub fn next(&mut self) {
        let queue = self.active_queue();
        let pos = self.queue_position(&queue);
        let Some(p) = next_position(queue.len(), pos, self.shuffle, &mut self.rng) else {
            log::warn!("player: next with an empty queue");
            return;
        };
        self.jump_to(queue[p]);
    }

    pub fn prev(&mut self) {
        let queue = self.active_queue();
        let pos = self.queue_position(&queue);
        let Some(p) = prev_position(queue.len(), pos) else {
            log::warn!("player: prev with an empty queue");
            return;
        };
        self.jump_to(queue[p]);
    }

    /// Seek to `secs`, clamped to the track.
    pub fn seek_to(&mut self, secs: f64) {
        if !secs.is_finite() {
            return;
        }
        let mut target = secs.max(0.0);
        if let Some(d) = self.duration() {
            target = target.min(d.as_secs_f64());
        }
        if self.output.has_source() {
            if let Err(e) = self.output.seek(secs_to_duration(target)) {
                log::error!("player: seek to {target:.1}s failed: {e}");
                return;
            }
        }
        self.state.offset = target;
        self.push_position();
    }

    pub fn seek_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.seek_to(self.position() + delta);
    }

    fn transport(&mut self, cmd: ControlCmd) {
        match cmd {
            ControlCmd::Play => self.play(),
            // The OS "stop" key keeps the source so playback can resume.
            ControlCmd::Pause | ControlCmd::Stop => self.pause(),
            ControlCmd::PlayPause => self.toggle(),
            ControlCmd::Next => self.next(),
            ControlCmd::Prev => self.prev(),
            ControlCmd::SeekBy(delta) => self.seek_by(delta),
            ControlCmd::SeekTo(secs) => self.seek_to(secs),
            ControlCmd::Quit => self.quit_requested = true,
        }
    }

    fn jump_to(&mut self, index: usize) {
        self.stop();
        self.state.current_index = index;
        self.state.offset = 0.0;
        self.play();
    }

    fn queue_position(&self, queue: &[usize]) -> Option<usize> {
        queue.iter().position(|&i| i == self.state.current_index)
    }

    fn prepare_graph(&mut self) -> Result<(), crate::audio::AudioError> {
        match self.output.graph_state() {
            GraphState::Uninitialized => self.output.ensure_graph(),
            GraphState::Suspended => self.output.resume_graph(),
            GraphState::Running => Ok(()),
        }
    }

    // ---- asynchronous notifications ---------------------------------------

    fn on_ended(&mut self, token: u64) {
        if token != self.state.play_sequence {
            log::debug!(
                "player: ignoring end of stale source {token} (current {})",
                self.state.play_sequence
            );
            return;
        }
        self.state.status = PlaybackStatus::Stopped;
        self.state.offset = 0.0;
        self.controls.set_status(PlaybackStatus::Stopped);
        self.next();
    }

    fn on_analysis_finished(&mut self, key: &str, peak: Option<f32>) {
        self.analysis.finish(key);
        match peak {
            Some(p) if p > 0.0 => {
                log::info!("analysis: {key} peaks at {p:.3}");
                self.storage.save_peak(key, p);
                if self.current_key() == Some(key) {
                    self.apply_gain();
                }
            }
            _ => log::warn!("analysis: no usable peak for {key}"),
        }
        self.pump_analysis();
    }

    /// Keep audio flowing after the terminal loses focus and the device
    /// stream went away underneath us.
    fn on_visibility(&mut self, hidden: bool) {
        if !hidden
            || !self.state.is_playing()
            || self.output.graph_state() == GraphState::Running
        {
            return;
        }
        let offset = self.position();
        if let Err(e) = self.output.resume_graph() {
            log::error!("player: cannot resume audio output: {e}");
            return;
        }
        let Some(track) = self.current_track().cloned() else {
            return;
        };
        self.state.offset = offset;
        let token = self.state.play_sequence;
        match self.output.load(&track, secs_to_duration(offset), token) {
            Ok(()) => {
                self.output.set_volume(1.0);
                self.apply_gain();
                self.output.play();
            }
            Err(e) => {
                log::error!("player: cannot reattach {:?}: {e}", track.path);
                self.output.unload();
                self.state.status = PlaybackStatus::Stopped;
                self.controls.set_status(PlaybackStatus::Stopped);
            }
        }
    }

    // ---- gain and analysis -------------------------------------------------

    fn apply_gain(&mut self) {
        let peak = self
            .library
            .key_at(self.state.current_index)
            .and_then(|key| self.storage.load_peak(key));
        let gain = normalization_gain(
            self.normalize,
            peak,
            self.tuning.normalize_target,
            self.tuning.normalize_max_gain,
        );
        self.output.set_gain(gain);
    }

    fn enqueue_analysis(&mut self, keys: &[String]) {
        self.analysis
            .enqueue(keys.iter().map(String::as_str), &self.storage);
        self.pump_analysis();
    }

    fn pump_analysis(&mut self) {
        let Some(job) = self.analysis.next_job(&self.library, &self.storage) else {
            return;
        };
        let key = job.key.clone();
        if !self.worker.submit(job) {
            self.analysis.finish(&key);
        }
    }

    fn current_playlist_items(&self) -> Vec<String> {
        self.playlists
            .current()
            .map(|p| p.items.clone())
            .unwrap_or_default()
    }

    // ---- library -----------------------------------------------------------

    /// Scan `paths` and append what is found.
    pub fn load_paths(&mut self, paths: &[PathBuf], settings: &LibrarySettings) -> LoadReport {
        let tracks = library::scan(paths, settings);
        if tracks.is_empty() {
            log::warn!("library: nothing playable under {paths:?}");
        }
        self.load_tracks(tracks)
    }

    /// Append `tracks`. The current track keeps its identity by key.
    pub fn load_tracks(&mut self, tracks: Vec<Track>) -> LoadReport {
        let current_key = self.current_key().map(str::to_owned);
        let added = tracks.len();
        let shadowed = self.library.append(tracks);
        if let Some(i) = current_key.and_then(|k| self.library.index_of(&k)) {
            self.state.current_index = i;
        }
        log::info!(
            "library: {added} tracks added, {} total",
            self.library.len()
        );

        let items = self.current_playlist_items();
        self.enqueue_analysis(&items);
        LoadReport { added, shadowed }
    }

    // ---- toggles -----------------------------------------------------------

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        self.save_settings();
    }

    pub fn toggle_normalize(&mut self) {
        self.normalize = !self.normalize;
        self.save_settings();
        self.apply_gain();
    }

    fn save_settings(&mut self) {
        self.storage.save_settings(PlayerSettings {
            shuffle: self.shuffle,
            normalize: self.normalize,
        });
    }

    // ---- playlists -----------------------------------------------------------

    /// Add the library track at `index` to the current playlist, or remove
    /// it when already there. Returns `Some(true)` when it was added.
    pub fn toggle_in_current_playlist(&mut self, index: usize) -> Option<bool> {
        let Some(key) = self.library.key_at(index).map(str::to_owned) else {
            log::warn!("playlists: no library track at {index}");
            return None;
        };
        let existing = self
            .playlists
            .current()
            .and_then(|p| p.items.iter().position(|k| *k == key));
        if let Some(item) = existing {
            self.remove_from_current_playlist_at(item);
            return Some(false);
        }

        let id = self.current_or_default_playlist();
        let added = self.playlists.add_track(&id, &key, &mut self.storage);
        if added {
            self.enqueue_analysis(&[key]);
        }
        Some(added)
    }

    /// Add every loaded track missing from the current playlist. Returns how
    /// many were added.
    pub fn add_all_to_current_playlist(&mut self) -> usize {
        if self.library.is_empty() {
            return 0;
        }
        let id = self.current_or_default_playlist();
        let keys: Vec<String> = self.library.tracks().iter().map(|t| t.key.clone()).collect();
        let added = self
            .playlists
            .add_keys(&id, keys.iter().map(String::as_str), &mut self.storage);
        self.enqueue_analysis(&added);
        added.len()
    }

    /// Remove item `item` of the current playlist. Removing the loaded track
    /// stops playback and rewinds to the top of the library.
    pub fn remove_from_current_playlist_at(&mut self, item: usize) -> Option<String> {
        let id = self.playlists.current_id()?.to_owned();
        let removes_current = self
            .playlists
            .current()
            .and_then(|p| p.items.get(item))
            .is_some_and(|k| Some(k.as_str()) == self.current_key());

        let removed = self
            .playlists
            .remove_track_at(&id, item, &mut self.storage)?;
        if removes_current {
            self.reset_playback();
            self.save_resume_state();
        }
        Some(removed)
    }

    /// Play item `item` of the current playlist, or toggle it when it is
    /// the current track.
    pub fn activate_playlist_item(&mut self, item: usize) {
        let Some(key) = self
            .playlists
            .current()
            .and_then(|p| p.items.get(item))
            .cloned()
        else {
            return;
        };
        let Some(index) = self.library.index_of(&key) else {
            log::warn!("playlists: {key} is not loaded");
            return;
        };
        if index == self.state.current_index && self.state.is_playing() {
            self.pause();
        } else {
            self.start(index);
        }
    }

    pub fn create_playlist(&mut self, name: &str) -> String {
        self.capture_offset_if_playing();
        self.save_resume_state();
        let id = self.playlists.create(name, &mut self.storage);
        self.stop();
        self.state.offset = 0.0;
        self.controls.set_now_playing(None);
        id
    }

    pub fn rename_playlist(&mut self, id: &str, name: &str) -> bool {
        self.playlists.rename(id, name, &mut self.storage)
    }

    /// Delete `id` together with its resume point. Deleting the current
    /// playlist stops playback and rewinds.
    pub fn delete_playlist(&mut self, id: &str) -> bool {
        if self.playlists.get(id).is_none() {
            log::warn!("playlists: delete of unknown playlist {id}");
            return false;
        }
        let was_current = self.playlists.delete(id, &mut self.storage);
        if was_current {
            self.reset_playback();
        }
        true
    }

    /// Make `id` current and restore where it was left. Nothing plays.
    pub fn select_playlist(&mut self, id: &str) -> bool {
        let Some(items) = self.playlists.get(id).map(|p| p.items.clone()) else {
            log::warn!("playlists: select of unknown playlist {id}");
            return false;
        };
        self.leave_current_playlist();
        self.playlists.select(id, &mut self.storage);

        let saved = self.storage.load_resume_state(id);
        match saved.track_key.as_deref().and_then(|k| self.library.index_of(k)) {
            Some(i) => {
                self.state.current_index = i;
                self.state.offset = sanitize_offset(saved.offset);
            }
            None => {
                if let Some(i) = items.iter().find_map(|k| self.library.index_of(k)) {
                    self.state.current_index = i;
                }
                self.state.offset = 0.0;
            }
        }
        self.enqueue_analysis(&items);
        true
    }

    /// Pause `id` when it is current and playing; otherwise switch to it and
    /// play from its resume point.
    pub fn play_playlist(&mut self, id: &str) {
        if self.playlists.current_id() == Some(id) && self.state.is_playing() {
            self.pause();
            return;
        }
        let Some(items) = self.playlists.get(id).map(|p| p.items.clone()) else {
            log::warn!("playlists: play of unknown playlist {id}");
            return;
        };
        self.leave_current_playlist();
        self.playlists.select(id, &mut self.storage);

        let queue = self.active_queue();
        if let Some(&first) = queue.first() {
            let saved = self.storage.load_resume_state(id);
            let resumed = saved
                .track_key
                .as_deref()
                .and_then(|k| self.library.index_of(k))
                .filter(|i| queue.contains(i));
            match resumed {
                Some(i) => {
                    self.state.current_index = i;
                    self.state.offset = sanitize_offset(saved.offset);
                }
                None => {
                    self.state.current_index = first;
                    self.state.offset = 0.0;
                }
            }
            self.play();
        } else {
            self.controls.set_now_playing(None);
        }
        self.enqueue_analysis(&items);
    }

    /// Remember where the current playlist was, then stop.
    fn leave_current_playlist(&mut self) {
        self.capture_offset_if_playing();
        self.save_resume_state();
        self.stop();
    }

    fn current_or_default_playlist(&mut self) -> String {
        match self.playlists.current_id() {
            Some(id) => id.to_owned(),
            None => self.playlists.ensure_default(&mut self.storage),
        }
    }

    fn reset_playback(&mut self) {
        self.stop();
        self.state.offset = 0.0;
        self.state.current_index = 0;
        self.controls.set_now_playing(None);
    }

    // ---- persistence ---------------------------------------------------------

    fn capture_offset_if_playing(&mut self) {
        if self.state.is_playing() {
            self.state.offset = self.output.position().as_secs_f64();
        }
    }

    fn save_resume_state(&mut self) {
        let Some(id) = self.playlists.current_id().map(str::to_owned) else {
            log::debug!("player: no current playlist, resume point not saved");
            return;
        };
        let state = ResumeState {
            track_key: self.current_key().map(str::to_owned),
            offset: self.state.offset,
        };
        self.storage.save_resume_state(&id, state);
    }

    /// Restore the current playlist's resume point, as on launch.
    pub fn restore_resume_state(&mut self) {
        let Some(id) = self.playlists.current_id().map(str::to_owned) else {
            return;
        };
        let saved = self.storage.load_resume_state(&id);
        if let Some(i) = saved.track_key.as_deref().and_then(|k| self.library.index_of(k)) {
            self.state.current_index = i;
            self.state.offset = sanitize_offset(saved.offset);
        }
    }

    /// Forget every peak and resume point.
    pub fn clear_caches(&mut self) {
        self.storage.clear_caches();
        self.output.set_gain(1.0);
        log::info!("storage: normalization cache and resume points cleared");
    }

    /// Last step before the process exits.
    pub fn shutdown(&mut self) {
        self.capture_offset_if_playing();
        self.save_resume_state();
        self.output.unload();
    }

    // ---- media controls ------------------------------------------------------

    /// Push position and status to the media controls, at most once per
    /// sync interval.
    pub fn tick(&mut self, now: Instant) {
        if self
            .last_media_sync
            .is_some_and(|last| now.duration_since(last) < self.tuning.media_sync_interval)
        {
            return;
        }
        self.last_media_sync = Some(now);
        self.push_media_state();
    }

    fn push_media_state(&mut self) {
        self.controls.set_status(self.state.status);
        self.push_position();
    }

    fn push_position(&mut self) {
        let duration = self.duration();
        let mut position = secs_to_duration(self.position());
        if let Some(d) = duration {
            position = position.min(d);
        }
        self.controls.set_position(PositionState {
            position,
            duration,
            rate: 1.0,
        });
    }

    fn push_now_playing(&mut self) {
        let Some(track) = self.library.get(self.state.current_index) else {
            self.controls.set_now_playing(None);
            return;
        };
        let album = self
            .playlists
            .current()
            .map(|p: &Playlist| p.name.clone())
            .unwrap_or_default();
        let meta = self.metadata.extract(track).clone();
        let now = NowPlaying {
            title: meta
                .title
                .unwrap_or_else(|| display_name(&track.key).to_string()),
            artist: meta.artist.unwrap_or_else(|| album.clone()),
            album,
            length: self.output.duration().or(track.duration),
        };
        self.controls.set_now_playing(Some(now));
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

fn sanitize_offset(offset: f64) -> f64 {
    if offset.is_finite() { offset.max(0.0) } else { 0.0 }
}
