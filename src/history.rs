//! Session history store
//!
//! Owns the ordered entry sequence and the current position:
//! - Append with forward-branch truncation
//! - In-place replacement of the current (or any) entry
//! - Lookup by key and by URL
//! - Traversal that never adds or removes entries
//!
//! The store performs no I/O; keeping the host aligned is the controller's job.

use crate::entry::{EntryUpdate, HistoryEntry};
use crate::trace_log;

/// Ordered sequence of history entries plus the current index
///
/// Never empty: `0 <= current_index < len`.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    /// History stack
    entries: Vec<HistoryEntry>,
    /// Current position in history
    current: usize,
}

impl SessionHistory {
    /// Create a history holding a single entry
    pub fn new(initial: HistoryEntry) -> Self {
        Self {
            entries: vec![initial],
            current: 0,
        }
    }

    /// Get current entry
    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// Get current index
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Entry at `index`
    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Append an entry after the current one.
    ///
    /// Any forward branch is discarded first. Returns how many entries were
    /// dropped.
    pub fn append(&mut self, entry: HistoryEntry) -> usize {
        let discarded = self.entries.len() - (self.current + 1);
        if discarded > 0 {
            trace_log!("Discarding {} forward entries", discarded);
        }

        // Remove forward history when pushing
        self.entries.truncate(self.current + 1);

        self.entries.push(entry);
        self.current = self.entries.len() - 1;

        discarded
    }

    /// Merge `update` into the current entry
    pub fn replace_current(&mut self, update: EntryUpdate) -> bool {
        let index = self.current;
        self.update_at(index, update)
    }

    /// Merge `update` into the entry at `index`.
    ///
    /// Returns `false` when the index is out of range or nothing changed.
    pub fn update_at(&mut self, index: usize, update: EntryUpdate) -> bool {
        self.entries
            .get_mut(index)
            .is_some_and(|entry| update.apply_to(entry))
    }

    /// Position of the entry with `key`
    pub fn find_by_key(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    /// Position of an entry with `url`.
    ///
    /// When several entries share the URL, the one nearest to `near` wins; on a
    /// tie the earlier entry is preferred.
    pub fn find_by_url(&self, url: &str, near: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.url == url)
            .min_by_key(|(index, _)| (index.abs_diff(near), *index))
            .map(|(index, _)| index)
    }

    /// Move the current position without touching entries
    pub fn move_to(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        self.current < self.entries.len() - 1
    }

    /// Drop everything and start over from `initial`
    pub fn reset(&mut self, initial: HistoryEntry) {
        self.entries.clear();
        self.entries.push(initial);
        self.current = 0;
    }

    /// Get history length
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty (never true, kept for API symmetry)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all entries
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
