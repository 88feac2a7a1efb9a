use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::event::{DisableFocusChange, EnableFocusChange};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::analysis::AnalysisResult;
use crate::app::App;
use crate::controls::ControlCmd;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    let log_path = logging::init_logging(&settings.logging);
    if let Some(msg) = config_problem {
        log::warn!("config: {msg}");
    }
    if let Some(path) = &log_path {
        log::info!("encore {} starting, logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    }

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let (analysis_tx, analysis_rx) = mpsc::channel::<AnalysisResult>();
    let mut player = startup::build_player(&settings, control_tx, analysis_tx);

    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    let mut app = App::new();
    if !paths.is_empty() {
        let report = player.load_paths(&paths, &settings.library);
        if !report.shadowed.is_empty() {
            app.set_message(format!(
                "{} tracks share a name with an earlier one; the later file wins",
                report.shadowed.len()
            ));
        }
    }
    player.restore_resume_state();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut player,
            &control_rx,
            &analysis_rx,
            &mut state,
        )
    })();

    player.shutdown();
    log::info!("encore exiting");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
