//! Collaborator traits for the chainlog ledger.
//!
//! - `EntryStore`: ordered, append-only persistence (trusted to assign ids
//!   and timestamps)
//! - `Notifier`: best-effort sink for append events
//!
//! The `Ledger` owns one of each and is the only caller that writes.

use chainlog_contracts::{ChainEvent, ChainlogResult, EntryId, LinkedEntry, LogEntry};

/// Ordered, append-only storage for log entries.
///
/// Implementations never mutate or remove a stored entry. "Chronological"
/// everywhere means `created_at` ascending with `id` ascending as the
/// tie-break.
pub trait EntryStore: Send + Sync {
    /// Persist `entry`, assigning a fresh, strictly increasing id and a
    /// creation timestamp. Returns the stored entry.
    fn insert(&self, entry: LinkedEntry) -> ChainlogResult<LogEntry>;

    /// The chronologically latest entry, or `None` for an empty store.
    fn latest(&self) -> ChainlogResult<Option<LogEntry>>;

    /// Look up a single entry by id.
    fn get(&self, id: EntryId) -> ChainlogResult<Option<LogEntry>>;

    /// Entries in chronological order, truncated to the first `limit` when
    /// given. Must reflect one consistent snapshot of the store.
    fn list_chronological(&self, limit: Option<usize>) -> ChainlogResult<Vec<LogEntry>>;

    /// The newest `limit` entries, newest first.
    fn list_recent(&self, limit: usize) -> ChainlogResult<Vec<LogEntry>>;
}

/// A sink for ledger events.
///
/// Delivery is best-effort and outside the integrity guarantee: a notifier
/// swallows its own failures rather than failing the append that raised
/// the event.
///
/// `notify` runs while the ledger's append lock is held, so events arrive
/// in id order. It must not block or call back into the ledger.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &ChainEvent);
}
