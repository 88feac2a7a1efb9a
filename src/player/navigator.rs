//! Queue navigation: which library indices `next`/`prev` walk over, and where
//! they land.

use rand::Rng;

use crate::library::Library;
use crate::playlists::Playlist;

/// Library indices of the playlist's loaded items, in playlist order.
/// Falls back to the whole library when the playlist has none loaded.
pub fn active_queue(library: &Library, playlist: Option<&Playlist>) -> Vec<usize> {
    if let Some(p) = playlist {
        let queue: Vec<usize> = p
            .items
            .iter()
            .filter_map(|key| library.index_of(key))
            .collect();
        if !queue.is_empty() {
            return queue;
        }
    }
    (0..library.len()).collect()
}

/// Position after `current_pos`. `None` only for an empty queue.
///
/// Shuffle draws uniformly from every other position. When the current
/// track is not in the queue there is nothing to exclude.
pub fn next_position<R: Rng + ?Sized>(
    len: usize,
    current_pos: Option<usize>,
    shuffle: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if !shuffle {
        return Some(current_pos.map_or(0, |p| (p + 1) % len));
    }
    match current_pos {
        Some(pos) if len > 1 => {
            let r = rng.gen_range(0..len - 1);
            Some(if r >= pos { r + 1 } else { r })
        }
        Some(pos) => Some(pos),
        None => Some(rng.gen_range(0..len)),
    }
}

/// Cyclic previous position; shuffle plays no part.
pub fn prev_position(len: usize, current_pos: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(current_pos.map_or(0, |p| (p + len - 1) % len))
}
