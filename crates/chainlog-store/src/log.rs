//! The in-memory entry sequence shared by every store implementation.

use chrono::{DateTime, Utc};

use chainlog_contracts::{EntryId, LinkedEntry, LogEntry};

/// Entries held in insertion order plus the next id to assign.
#[derive(Debug, Default)]
pub(crate) struct EntryLog {
    pub(crate) entries: Vec<LogEntry>,
    next_id: EntryId,
}

impl EntryLog {
    /// Rebuild from previously persisted entries.
    pub(crate) fn from_entries(entries: Vec<LogEntry>) -> Self {
        let next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self { entries, next_id }
    }

    /// Assign the next id and a creation timestamp to `entry` without
    /// storing it.
    ///
    /// The timestamp is clamped to the current tail's, so a clock stepping
    /// backwards cannot sort the new entry ahead of its predecessor.
    pub(crate) fn stamp(&self, entry: LinkedEntry, now: DateTime<Utc>) -> LogEntry {
        let id = self.next_id.max(1);
        let created_at = match self.latest() {
            Some(tail) if tail.created_at > now => tail.created_at,
            _ => now,
        };
        entry.into_entry(id, created_at)
    }

    /// Append an entry produced by `stamp`.
    pub(crate) fn commit(&mut self, stored: LogEntry) {
        self.next_id = stored.id + 1;
        self.entries.push(stored);
    }

    /// `stamp` followed by `commit`.
    pub(crate) fn push(&mut self, entry: LinkedEntry, now: DateTime<Utc>) -> LogEntry {
        let stored = self.stamp(entry, now);
        self.commit(stored.clone());
        stored
    }

    pub(crate) fn latest(&self) -> Option<&LogEntry> {
        self.entries.iter().max_by_key(|e| e.chronological_key())
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn chronological(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let mut ordered: Vec<&LogEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|e| e.chronological_key());
        ordered
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub(crate) fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let mut ordered: Vec<&LogEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|e| std::cmp::Reverse(e.chronological_key()));
        ordered.into_iter().take(limit).cloned().collect()
    }
}
