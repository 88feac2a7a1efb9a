//! UI rendering for the terminal user interface.
//!
//! Three screens share one frame: a header with the screen tabs, a status box
//! with the now-playing line, the list of the visible screen and a footer that
//! doubles as the input prompt.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::library::display_name;
use crate::player::{PlaybackStatus, Player};

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn controls_text(screen: Screen, seek_step_secs: u64) -> String {
    let common = [
        "[tab] screens".to_string(),
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{seek_step_secs}s"),
        "[s] shuffle".to_string(),
        "[n] normalize".to_string(),
    ];
    let specific: &[&str] = match screen {
        Screen::Library => &[
            "[enter] play",
            "[+] add/remove",
            "[A] add all",
            "[a] load path",
        ],
        Screen::Playlist => &["[enter] play", "[d/x] remove"],
        Screen::Playlists => &[
            "[enter] select",
            "[P] play/pause",
            "[c] new",
            "[r] rename",
            "[d] delete",
            "[C] clear caches",
        ],
    };
    common
        .into_iter()
        .chain(specific.iter().map(|s| s.to_string()))
        .chain(std::iter::once("[q] quit".to_string()))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The rows of `total` that fit in `height`, keeping `selected` centered when
/// possible. Returns `(start, end, selected_pos_in_window)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    let selected = selected.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn status_text(player: &mut Player) -> String {
    let mut parts: Vec<String> = Vec::new();
    let state = player.state().clone();

    let label = player.label(state.current_index);
    match (state.status, label) {
        (PlaybackStatus::Stopped, _) | (_, None) => parts.push("Stopped".to_string()),
        (status, Some(song)) => {
            let elapsed = format_mmss(Duration::from_secs_f64(player.position().max(0.0)));
            let time = match player.duration() {
                Some(total) => format!("{elapsed}/{}", format_mmss(total)),
                None => elapsed,
            };
            let word = if status == PlaybackStatus::Playing {
                "Playing"
            } else {
                "Paused"
            };
            parts.push(format!("{word}: {song} [{time}]"));
        }
    }

    parts.push(format!(
        "Shuffle: {}",
        if player.shuffle() { "ON" } else { "OFF" }
    ));
    if player.normalize() {
        parts.push(format!("Normalize: ON ({:.2}x)", player.gain()));
    } else {
        parts.push("Normalize: OFF".to_string());
    }
    match player.playlists().current() {
        Some(p) => parts.push(format!("Playlist: {}", p.name)),
        None => parts.push("Playlist: -".to_string()),
    }
    let analysis = player.analysis();
    let queued = analysis.pending_len() + usize::from(analysis.in_flight().is_some());
    if queued > 0 {
        parts.push(format!("Analyzing: {queued}"));
    }
    parts.join(" • ")
}

fn library_rows(player: &mut Player, start: usize, end: usize) -> Vec<ListItem<'static>> {
    let current = player.state().current_index;
    let playing = player.state().status != PlaybackStatus::Stopped;
    let members: Vec<String> = player
        .playlists()
        .current()
        .map(|p| p.items.clone())
        .unwrap_or_default();

    (start..end)
        .map(|i| {
            let key = player.library().key_at(i).unwrap_or_default().to_string();
            let label = player.label(i).unwrap_or_else(|| display_name(&key).to_string());
            let now = if playing && i == current { "♪ " } else { "  " };
            let member = if members.contains(&key) { "+ " } else { "  " };
            ListItem::new(format!("{now}{member}{label}"))
        })
        .collect()
}

fn playlist_rows(player: &mut Player, items: &[String]) -> Vec<ListItem<'static>> {
    let current_key = player.current_key().map(str::to_owned);
    let playing = player.state().status != PlaybackStatus::Stopped;

    items
        .iter()
        .map(|key| match player.library().index_of(key) {
            Some(i) => {
                let label = player.label(i).unwrap_or_else(|| display_name(key).to_string());
                let now = if playing && current_key.as_deref() == Some(key) {
                    "♪ "
                } else {
                    "  "
                };
                ListItem::new(format!("{now}{label}"))
            }
            None => ListItem::new(Line::from(vec![
                Span::raw("  "),
                Span::raw(display_name(key).to_string()).dim(),
                Span::raw(" (missing)").dim().italic(),
            ])),
        })
        .collect()
}

fn playlists_rows(player: &Player) -> Vec<ListItem<'static>> {
    let current = player.playlists().current_id();
    let playing = player.state().is_playing();
    player
        .playlists()
        .playlists()
        .iter()
        .map(|p| {
            let is_current = current == Some(p.id.as_str());
            let mark = match (is_current, playing) {
                (true, true) => "▶ ",
                (true, false) => "* ",
                _ => "  ",
            };
            let line = format!("{mark}{} ({} tracks)", p.name, p.items.len());
            if is_current {
                ListItem::new(line).bold()
            } else {
                ListItem::new(line)
            }
        })
        .collect()
}

/// Render the entire UI into `frame`.
pub fn draw(frame: &mut Frame, app: &App, player: &mut Player, seek_step_secs: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header: screen tabs.
    let tabs: Vec<Span> = [Screen::Library, Screen::Playlist, Screen::Playlists]
        .into_iter()
        .flat_map(|s| {
            let name = format!(" {} ", s.title());
            let span = if s == app.screen {
                Span::raw(name).reversed()
            } else {
                Span::raw(name)
            };
            [span, Span::raw(" ")]
        })
        .collect();
    let header = Paragraph::new(Line::from(tabs))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(player))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Main list. Only the visible window is built.
    let list_height = chunks[2].height.saturating_sub(2) as usize;
    let (title, rows, selected) = match app.screen {
        Screen::Library => {
            let total = player.library().len();
            let (start, end, sel) = visible_window(total, list_height, app.cursor());
            let title = format!(" library ({total}) ");
            (title, library_rows(player, start, end), (total > 0).then_some(sel))
        }
        Screen::Playlist => {
            let (name, items) = player
                .playlists()
                .current()
                .map(|p| (p.name.clone(), p.items.clone()))
                .unwrap_or_default();
            let (start, end, sel) = visible_window(items.len(), list_height, app.cursor());
            let title = if name.is_empty() {
                " no playlist ".to_string()
            } else {
                format!(" {name} ")
            };
            let rows = playlist_rows(player, &items[start..end]);
            (title, rows, (!items.is_empty()).then_some(sel))
        }
        Screen::Playlists => {
            let rows = playlists_rows(player);
            let total = rows.len();
            let (start, end, sel) = visible_window(total, list_height, app.cursor());
            let rows = rows.into_iter().skip(start).take(end - start).collect();
            (" playlists ".to_string(), rows, (total > 0).then_some(sel))
        }
    };
    let list = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, chunks[2], &mut state);

    // Footer: prompt, message or key help.
    let (footer_title, footer_text) = if let Some(prompt) = app.input.prompt() {
        (format!(" {prompt} "), format!("{}█", app.buffer))
    } else if let Some(msg) = &app.message {
        (" message ".to_string(), msg.clone())
    } else {
        (" controls ".to_string(), controls_text(app.screen, seek_step_secs))
    };
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(footer_title)
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests;
