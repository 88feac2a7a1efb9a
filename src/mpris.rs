//! MPRIS (D-Bus) media controls.
//!
//! A background thread owns the session-bus connection and serves the
//! `org.mpris.MediaPlayer2` and `org.mpris.MediaPlayer2.Player` interfaces.
//! Commands flow back to the runtime as `ControlCmd`s; the engine pushes state
//! in through `MprisControls`, which wakes the thread to emit change signals.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::controls::{ControlCmd, MediaControls, NowPlaying, PositionState};
use crate::player::PlaybackStatus;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.encore";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";
const READY_TIMEOUT: Duration = Duration::from_secs(2);
const SIGNAL_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct SharedState {
    status: PlaybackStatus,
    now: Option<NowPlaying>,
    /// Bumped per track so clients see a fresh `mpris:trackid`.
    track_serial: u64,
    position_micros: i64,
}

impl SharedState {
    fn track_id(&self) -> String {
        match self.now {
            Some(_) => format!("/org/mpris/MediaPlayer2/track/{}", self.track_serial),
            None => NO_TRACK.to_string(),
        }
    }
}

/// What changed since the last signal round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Status,
    Metadata,
}

/// `MediaControls` backed by the MPRIS service thread.
pub struct MprisControls {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<Change>,
}

impl MediaControls for MprisControls {
    fn set_now_playing(&mut self, now: Option<NowPlaying>) {
        if let Ok(mut s) = self.state.lock() {
            if now.is_some() {
                s.track_serial += 1;
            }
            s.now = now;
        }
        let _ = self.notify.send(Change::Metadata);
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        let changed = match self.state.lock() {
            Ok(mut s) if s.status != status => {
                s.status = status;
                true
            }
            _ => false,
        };
        if changed {
            let _ = self.notify.send(Change::Status);
        }
    }

    fn set_position(&mut self, position: PositionState) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = duration_micros(position.position);
        }
    }
}

fn duration_micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

fn micros_to_secs(us: i64) -> f64 {
    us as f64 / 1_000_000.0
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "encore"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        ["audio/mpeg", "audio/mp4", "audio/wav", "audio/ogg", "audio/flac"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    /// Relative seek; `offset` is in microseconds.
    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::SeekBy(micros_to_secs(offset)));
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let current = self.state.lock().ok().map(|s| s.track_id());
        if current.as_deref() != Some(track_id.as_str()) {
            log::debug!("mpris: SetPosition for stale track {track_id}");
            return;
        }
        let _ = self.tx.send(ControlCmd::SeekTo(micros_to_secs(position)));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.status {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        match self.state.lock() {
            Ok(s) => metadata_map(&s),
            Err(_) => HashMap::new(),
        }
    }
}

fn metadata_map(s: &SharedState) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    let mut put = |key: &str, value: Value<'_>| {
        if let Ok(v) = OwnedValue::try_from(value) {
            map.insert(key.to_string(), v);
        }
    };

    if let Ok(path) = ObjectPath::try_from(s.track_id()) {
        put("mpris:trackid", Value::from(path));
    }
    let Some(now) = &s.now else {
        return map;
    };
    put("xesam:title", Value::from(now.title.clone()));
    if !now.artist.is_empty() {
        put("xesam:artist", Value::from(vec![now.artist.clone()]));
    }
    if !now.album.is_empty() {
        put("xesam:album", Value::from(now.album.clone()));
    }
    if let Some(len) = now.length {
        put("mpris:length", Value::from(duration_micros(len)));
    }
    map
}

/// Connect to the session bus and serve MPRIS on a background thread.
///
/// Fails when the bus is unreachable or neither interface could be
/// registered; the caller is expected to fall back to no-op controls.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> Result<MprisControls, String> {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<Change>();
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(serve(tx, state_for_thread, notify_rx, ready_tx));
    });

    match ready_rx.recv_timeout(READY_TIMEOUT) {
        Ok(Ok(())) => Ok(MprisControls {
            state,
            notify: notify_tx,
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => Err("timed out waiting for the session bus".to_string()),
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<Change>,
    ready: Sender<Result<(), String>>,
) {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(format!("failed to connect to session bus: {e}")));
            return;
        }
    };

    if let Err(e) = connection.request_name(BUS_NAME).await {
        let _ = ready.send(Err(format!("failed to acquire {BUS_NAME}: {e}")));
        return;
    }

    // Each interface is registered on its own so one failure does not take
    // the other down.
    let object_server = connection.object_server();
    let root_ok = match object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
        Ok(_) => true,
        Err(e) => {
            log::warn!("mpris: failed to register root iface: {e}");
            false
        }
    };
    let player_ok = match object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await {
        Ok(_) => true,
        Err(e) => {
            log::warn!("mpris: failed to register player iface: {e}");
            false
        }
    };
    if !root_ok && !player_ok {
        let _ = ready.send(Err("no MPRIS interface could be registered".to_string()));
        return;
    }
    let _ = ready.send(Ok(()));
    log::info!("mpris: serving as {BUS_NAME}");

    let player_ref = if player_ok {
        object_server
            .interface::<_, PlayerIface>(OBJECT_PATH)
            .await
            .ok()
    } else {
        None
    };

    loop {
        Timer::after(SIGNAL_POLL).await;
        let mut status = false;
        let mut metadata = false;
        loop {
            match notify.try_recv() {
                Ok(Change::Status) => status = true,
                Ok(Change::Metadata) => metadata = true,
                Err(mpsc::TryRecvError::Empty) => break,
                // The engine is gone; keep the connection until the process exits.
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        if let Some(iface) = &player_ref {
            emit_changes(iface, status, metadata).await;
        }
    }
}

async fn emit_changes(iface: &InterfaceRef<PlayerIface>, status: bool, metadata: bool) {
    if !status && !metadata {
        return;
    }
    let emitter = iface.signal_emitter();
    let player = iface.get().await;
    if status {
        if let Err(e) = player.playback_status_changed(emitter).await {
            log::debug!("mpris: PlaybackStatus signal failed: {e}");
        }
    }
    if metadata {
        if let Err(e) = player.metadata_changed(emitter).await {
            log::debug!("mpris: Metadata signal failed: {e}");
        }
    }
}
