use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::analysis::AnalysisResult;
use crate::app::{App, Confirm, InputMode, Screen};
use crate::config;
use crate::controls::ControlCmd;
use crate::player::{Player, PlayerEvent};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: draws, applies media-key commands and analysis
/// results, forwards decoder events and handles input. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    control_rx: &Receiver<ControlCmd>,
    analysis_rx: &Receiver<AnalysisResult>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let seek_step = settings.audio.seek_step_secs;
        terminal.draw(|f| ui::draw(f, app, player, seek_step))?;

        while let Ok(cmd) = control_rx.try_recv() {
            player.handle(PlayerEvent::Transport(cmd));
        }
        if player.quit_requested() {
            return Ok(());
        }

        while let Ok(AnalysisResult { key, peak }) = analysis_rx.try_recv() {
            player.handle(PlayerEvent::AnalysisFinished { key, peak });
        }

        player.poll_output();
        player.tick(Instant::now());

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, app, player, state) {
                        return Ok(());
                    }
                }
                Event::FocusLost => player.handle(PlayerEvent::Visibility { hidden: true }),
                Event::FocusGained => player.handle(PlayerEvent::Visibility { hidden: false }),
                _ => {}
            }
        }

        clamp_cursors(app, player);
    }
}

fn list_lens(player: &Player) -> (usize, usize, usize) {
    let playlist = player.playlists().current().map_or(0, |p| p.items.len());
    (
        player.library().len(),
        playlist,
        player.playlists().playlists().len(),
    )
}

fn visible_len(app: &App, player: &Player) -> usize {
    let (library, playlist, playlists) = list_lens(player);
    match app.screen {
        Screen::Library => library,
        Screen::Playlist => playlist,
        Screen::Playlists => playlists,
    }
}

fn clamp_cursors(app: &mut App, player: &Player) {
    let (library, playlist, playlists) = list_lens(player);
    app.clamp_cursors(library, playlist, playlists);
}

/// Playlist under the cursor on the playlists screen.
fn selected_playlist(app: &App, player: &Player) -> Option<(String, String)> {
    player
        .playlists()
        .playlists()
        .get(app.cursor())
        .map(|p| (p.id.clone(), p.name.clone()))
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    state: &mut EventLoopState,
) -> bool {
    if app.input != InputMode::Normal {
        state.pending_gg = false;
        handle_input_key(key, settings, app, player);
        return false;
    }

    app.message = None;
    let len = visible_len(app, player);

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.next_screen(),
        KeyCode::BackTab => app.prev_screen(),
        KeyCode::Char('j') | KeyCode::Down => app.next(len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(len),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.bottom(len),
        KeyCode::Enter => match app.screen {
            Screen::Library if len > 0 => player.activate(app.cursor()),
            Screen::Playlist if len > 0 => player.activate_playlist_item(app.cursor()),
            Screen::Playlists => {
                if let Some((id, name)) = selected_playlist(app, player) {
                    player.select_playlist(&id);
                    app.set_message(format!("selected \"{name}\""));
                }
            }
            _ => {}
        },
        KeyCode::Char('p') | KeyCode::Char(' ') => player.toggle(),
        KeyCode::Char('l') => player.next(),
        KeyCode::Char('h') => player.prev(),
        KeyCode::Char('L') => player.seek_by(settings.audio.seek_step_secs as f64),
        KeyCode::Char('H') => player.seek_by(-(settings.audio.seek_step_secs as f64)),
        KeyCode::Char('s') => player.toggle_shuffle(),
        KeyCode::Char('n') => player.toggle_normalize(),
        KeyCode::Char('+') if app.screen == Screen::Library => {
            match player.toggle_in_current_playlist(app.cursor()) {
                Some(true) => app.set_message("added to playlist"),
                Some(false) => app.set_message("removed from playlist"),
                None => {}
            }
        }
        KeyCode::Char('A') if app.screen == Screen::Library => {
            let added = player.add_all_to_current_playlist();
            app.set_message(format!("added {added} tracks to playlist"));
        }
        KeyCode::Char('a') if app.screen == Screen::Library => {
            app.begin_input(InputMode::AddPath, "");
        }
        KeyCode::Char('d') | KeyCode::Char('x') => match app.screen {
            Screen::Playlist => {
                if let Some(key) = player.remove_from_current_playlist_at(app.cursor()) {
                    app.set_message(format!("removed {key}"));
                }
            }
            Screen::Playlists => {
                if let Some((id, name)) = selected_playlist(app, player) {
                    app.begin_input(InputMode::Confirm(Confirm::DeletePlaylist { id, name }), "");
                }
            }
            Screen::Library => {}
        },
        KeyCode::Char('c') if app.screen == Screen::Playlists => {
            app.begin_input(InputMode::NewPlaylist, "");
        }
        KeyCode::Char('r') if app.screen == Screen::Playlists => {
            if let Some((id, name)) = selected_playlist(app, player) {
                app.begin_input(InputMode::RenamePlaylist { id }, &name);
            }
        }
        KeyCode::Char('P') if app.screen == Screen::Playlists => {
            if let Some((id, _)) = selected_playlist(app, player) {
                player.play_playlist(&id);
            }
        }
        KeyCode::Char('C') => app.begin_input(InputMode::Confirm(Confirm::ClearCaches), ""),
        _ => {}
    }

    false
}

fn handle_input_key(key: KeyEvent, settings: &config::Settings, app: &mut App, player: &mut Player) {
    if let InputMode::Confirm(_) = app.input {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let (mode, _) = app.finish_input();
                submit(mode, String::new(), settings, app, player);
            }
            _ => app.cancel_input(),
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Enter => {
            let (mode, text) = app.finish_input();
            submit(mode, text, settings, app, player);
        }
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn submit(
    mode: InputMode,
    text: String,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
) {
    let text = text.trim();
    match mode {
        InputMode::Normal => {}
        InputMode::AddPath => {
            if text.is_empty() {
                return;
            }
            let report = player.load_paths(&[expand_home(text)], &settings.library);
            let mut msg = format!("loaded {} tracks", report.added);
            if !report.shadowed.is_empty() {
                msg.push_str(&format!(
                    "; {} replaced an earlier track with the same name: {}",
                    report.shadowed.len(),
                    report.shadowed.join(", ")
                ));
            }
            app.set_message(msg);
        }
        InputMode::NewPlaylist => {
            if text.is_empty() {
                return;
            }
            player.create_playlist(text);
            app.set_message(format!("created \"{text}\""));
        }
        InputMode::RenamePlaylist { id } => {
            if !text.is_empty() && player.rename_playlist(&id, text) {
                app.set_message(format!("renamed to \"{text}\""));
            }
        }
        InputMode::Confirm(Confirm::DeletePlaylist { id, name }) => {
            if player.delete_playlist(&id) {
                app.set_message(format!("deleted \"{name}\""));
            }
        }
        InputMode::Confirm(Confirm::ClearCaches) => {
            player.clear_caches();
            app.set_message("caches cleared");
        }
    }
}

fn expand_home(text: &str) -> PathBuf {
    match text.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(text)),
        None => PathBuf::from(text),
    }
}
