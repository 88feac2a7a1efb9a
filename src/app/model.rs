//! Application model types: `App`, `Screen` and `InputMode`.
//!
//! `App` holds view-only state: which screen is shown, where each cursor
//! sits and what the user is typing. Everything about playback lives in the
//! engine.

/// The three views, in `Tab` order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Library,
    Playlist,
    Playlists,
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Screen::Library => Screen::Playlist,
            Screen::Playlist => Screen::Playlists,
            Screen::Playlists => Screen::Library,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Screen::Library => Screen::Playlists,
            Screen::Playlist => Screen::Library,
            Screen::Playlists => Screen::Playlist,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Library => "library",
            Screen::Playlist => "playlist",
            Screen::Playlists => "playlists",
        }
    }
}

/// Something the user asked for that needs a `y` first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirm {
    DeletePlaylist { id: String, name: String },
    ClearCaches,
}

/// What keystrokes currently mean.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a file or directory path to load.
    AddPath,
    NewPlaylist,
    RenamePlaylist { id: String },
    Confirm(Confirm),
}

impl InputMode {
    pub fn prompt(&self) -> Option<String> {
        match self {
            InputMode::Normal => None,
            InputMode::AddPath => Some("add path".to_string()),
            InputMode::NewPlaylist => Some("new playlist name".to_string()),
            InputMode::RenamePlaylist { .. } => Some("rename playlist".to_string()),
            InputMode::Confirm(Confirm::DeletePlaylist { name, .. }) => {
                Some(format!("delete playlist \"{name}\"? (y/n)"))
            }
            InputMode::Confirm(Confirm::ClearCaches) => {
                Some("clear normalization cache and all resume points? (y/n)".to_string())
            }
        }
    }
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub screen: Screen,
    library_cursor: usize,
    playlist_cursor: usize,
    playlists_cursor: usize,

    pub input: InputMode,
    pub buffer: String,

    /// One-line message shown under the lists until the next key press.
    pub message: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_screen(&mut self) {
        self.screen = self.screen.next();
    }

    pub fn prev_screen(&mut self) {
        self.screen = self.screen.prev();
    }

    /// Cursor of the visible screen.
    pub fn cursor(&self) -> usize {
        match self.screen {
            Screen::Library => self.library_cursor,
            Screen::Playlist => self.playlist_cursor,
            Screen::Playlists => self.playlists_cursor,
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.screen {
            Screen::Library => &mut self.library_cursor,
            Screen::Playlist => &mut self.playlist_cursor,
            Screen::Playlists => &mut self.playlists_cursor,
        }
    }

    /// Place the cursor of the visible screen, clamped to a list of `len`.
    pub fn set_cursor(&mut self, pos: usize, len: usize) {
        *self.cursor_mut() = if len == 0 { 0 } else { pos.min(len - 1) };
    }

    /// Move the selection down, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let c = self.cursor_mut();
        *c = (*c + 1) % len;
    }

    /// Move the selection up, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let c = self.cursor_mut();
        *c = if *c == 0 || *c >= len { len - 1 } else { *c - 1 };
    }

    pub fn top(&mut self) {
        *self.cursor_mut() = 0;
    }

    pub fn bottom(&mut self, len: usize) {
        *self.cursor_mut() = len.saturating_sub(1);
    }

    /// Pull every cursor back inside its list after the lists changed.
    pub fn clamp_cursors(&mut self, library: usize, playlist: usize, playlists: usize) {
        let clamp = |c: usize, len: usize| if len == 0 { 0 } else { c.min(len - 1) };
        self.library_cursor = clamp(self.library_cursor, library);
        self.playlist_cursor = clamp(self.playlist_cursor, playlist);
        self.playlists_cursor = clamp(self.playlists_cursor, playlists);
    }

    pub fn is_typing(&self) -> bool {
        matches!(
            self.input,
            InputMode::AddPath | InputMode::NewPlaylist | InputMode::RenamePlaylist { .. }
        )
    }

    /// Switch to `mode` with `initial` already in the buffer.
    pub fn begin_input(&mut self, mode: InputMode, initial: &str) {
        self.input = mode;
        self.buffer.clear();
        self.buffer.push_str(initial);
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() {
            self.buffer.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.buffer.pop();
    }

    /// Leave input mode, returning the mode and what was typed.
    pub fn finish_input(&mut self) -> (InputMode, String) {
        let mode = std::mem::take(&mut self.input);
        (mode, std::mem::take(&mut self.buffer))
    }

    pub fn cancel_input(&mut self) {
        self.input = InputMode::Normal;
        self.buffer.clear();
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }
}
