use std::fs::{self, File};
use std::path::PathBuf;

use simplelog::{Config, WriteLogger};

use crate::config;

/// Send `log` output to a file. The terminal belongs to the UI, so nothing
/// is written to stderr; if the file cannot be created logging stays off.
pub fn init_logging(settings: &config::LoggingSettings) -> Option<PathBuf> {
    let path = settings
        .file
        .clone()
        .unwrap_or_else(config::default_log_path);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = File::create(&path).ok()?;
    WriteLogger::init(settings.level.to_filter(), Config::default(), file).ok()?;
    Some(path)
}
