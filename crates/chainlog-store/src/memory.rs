//! In-memory implementation of `EntryStore`.
//!
//! `InMemoryEntryStore` keeps every entry in a `Vec` behind a `Mutex`.
//! Clones share the same state, so a test or a host process can keep a
//! handle after boxing one clone into a `Ledger`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use chainlog_contracts::{ChainlogError, ChainlogResult, EntryId, LinkedEntry, LogEntry};
use chainlog_core::traits::EntryStore;

use crate::log::EntryLog;

/// Source of creation timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// An in-memory, append-only entry store.
#[derive(Clone)]
pub struct InMemoryEntryStore {
    pub(crate) state: Arc<Mutex<EntryLog>>,
    clock: Clock,
}

impl InMemoryEntryStore {
    /// Create an empty store stamping entries with `Utc::now()`.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Create an empty store stamping entries with `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: Arc::new(Mutex::new(EntryLog::default())),
            clock,
        }
    }

    /// Number of stored entries. Reads through a poisoned lock: a count
    /// cannot be left half-updated.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> ChainlogResult<MutexGuard<'_, EntryLog>> {
        self.state
            .lock()
            .map_err(|e| ChainlogError::storage(format!("entry store lock poisoned: {}", e)))
    }
}

impl Default for InMemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore for InMemoryEntryStore {
    fn insert(&self, entry: LinkedEntry) -> ChainlogResult<LogEntry> {
        let now = (self.clock)();
        let mut state = self.lock()?;
        let stored = state.push(entry, now);

        debug!(id = stored.id, created_at = %stored.created_at, "entry stored in memory");
        Ok(stored)
    }

    fn latest(&self) -> ChainlogResult<Option<LogEntry>> {
        Ok(self.lock()?.latest().cloned())
    }

    fn get(&self, id: EntryId) -> ChainlogResult<Option<LogEntry>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list_chronological(&self, limit: Option<usize>) -> ChainlogResult<Vec<LogEntry>> {
        Ok(self.lock()?.chronological(limit))
    }

    fn list_recent(&self, limit: usize) -> ChainlogResult<Vec<LogEntry>> {
        Ok(self.lock()?.recent(limit))
    }
}
