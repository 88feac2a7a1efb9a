use std::collections::VecDeque;

use crate::library::{Library, Track};
use crate::storage::Storage;

/// A track handed to the peak worker.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisJob {
    pub key: String,
    pub track: Track,
}

/// FIFO of track keys waiting for peak analysis.
///
/// At most one job is in flight. `in_flight` doubles as the drain guard:
/// while it is set, `next_job` hands out nothing and `enqueue` only grows
/// `pending`.
#[derive(Debug, Default)]
pub struct AnalysisQueue {
    pending: VecDeque<String>,
    in_flight: Option<String>,
}

impl AnalysisQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every key that has no cached peak and is not already queued.
    /// Returns how many keys were added.
    pub fn enqueue<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>, storage: &Storage) -> usize {
        let mut added = 0;
        for key in keys {
            if storage.load_peak(key).is_some()
                || self.in_flight.as_deref() == Some(key)
                || self.pending.iter().any(|k| k == key)
            {
                continue;
            }
            self.pending.push_back(key.to_string());
            added += 1;
        }
        added
    }

    /// Pop the next analyzable key, skipping keys that got a peak meanwhile
    /// and keys no loaded track answers to.
    pub fn next_job(&mut self, library: &Library, storage: &Storage) -> Option<AnalysisJob> {
        if self.in_flight.is_some() {
            return None;
        }
        while let Some(key) = self.pending.pop_front() {
            if storage.load_peak(&key).is_some() {
                continue;
            }
            let Some(track) = library.by_key(&key) else {
                log::warn!("analysis: skipping {key:?}, track not loaded");
                continue;
            };
            self.in_flight = Some(key.clone());
            return Some(AnalysisJob {
                key,
                track: track.clone(),
            });
        }
        None
    }

    /// Release the drain guard for `key`.
    pub fn finish(&mut self, key: &str) {
        if self.in_flight.as_deref() == Some(key) {
            self.in_flight = None;
        } else {
            log::debug!("analysis: finish for {key:?} which was not in flight");
        }
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.pending.is_empty()
    }

    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
