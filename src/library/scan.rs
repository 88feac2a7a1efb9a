use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Read the duration from the container header. Tags are not needed here;
/// title/artist come from the ID3 walker in `metadata`.
fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        Err(e) => {
            log::debug!("library: no duration for {:?}: {e}", path);
            None
        }
    }
}

/// Collect audio files from `paths`, in selection order.
///
/// Each path may be a file or a directory. Directories are walked (sorted by
/// file name so repeated loads are deterministic); files are taken as-is when
/// their extension is on the allow-list.
pub fn scan(paths: &[impl AsRef<Path>], settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    for root in paths {
        let root = root.as_ref();
        if root.is_file() {
            if is_audio_file(root, settings) {
                tracks.push(Track::from_path(root, probe_duration(root)));
            } else {
                log::info!("library: skipping {:?} (extension not allowed)", root);
            }
            continue;
        }

        let mut walker = WalkDir::new(root)
            .follow_links(settings.follow_links)
            .sort_by_file_name();

        // Non-recursive = only the root directory.
        let depth_cap = if settings.recursive {
            settings.max_depth
        } else {
            Some(1)
        };
        if let Some(d) = depth_cap {
            walker = walker.max_depth(d);
        }

        for entry in walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(err) => {
                    log::warn!("library: walk error under {:?}: {err}", root);
                    None
                }
            })
        {
            let path = entry.path();
            if path.is_file() && is_audio_file(path, settings) {
                tracks.push(Track::from_path(path, probe_duration(path)));
            }
        }
    }

    log::info!("library: scanned {} audio file(s)", tracks.len());
    tracks
}
