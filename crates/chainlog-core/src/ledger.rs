//! The chainlog ledger: the single writer in front of an `EntryStore`.
//!
//! Append pipeline:
//!
//!   Validate → [lock] → Supersedes check → Read tail → Canonicalize → Hash → Insert → Notify → [unlock]
//!
//! Everything between lock and unlock runs under one mutex, so two appends
//! can never read the same tail hash and fork the chain, and subscribers
//! see events in id order. Reads take no
//! ledger lock; they rely on the store returning a consistent snapshot.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chainlog_chain::{chain_hash, linked_payload, verify_chain};
use chainlog_contracts::{
    ChainEvent, ChainlogError, ChainlogResult, EntryId, IntegrityReport, LinkedEntry, LogEntry,
    NewEntry,
};

use crate::{
    traits::{EntryStore, Notifier},
    validate::validate_new_entry,
};

/// Bounds on how many entries a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListLimits {
    /// Used when the caller gives no limit.
    pub default_limit: usize,
    /// Largest limit a caller may request.
    pub max_limit: usize,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

/// Append-only, hash-chained log over a pluggable store.
///
/// Construct one ledger per store. A second ledger writing to the same store
/// would not share the append mutex.
pub struct Ledger {
    store: Box<dyn EntryStore>,
    notifier: Option<Arc<dyn Notifier>>,
    append_lock: Mutex<()>,
    limits: ListLimits,
}

impl Ledger {
    /// Create a ledger with no notifier and default list limits.
    pub fn new(store: Box<dyn EntryStore>) -> Self {
        Self {
            store,
            notifier: None,
            append_lock: Mutex::new(()),
            limits: ListLimits::default(),
        }
    }

    /// Publish an `Appended` event to `notifier` after every append.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_limits(mut self, limits: ListLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validate, link, and persist a new entry.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty author or body, an out-of-range
    ///   `node_code` / `input_code`, or a `supersedes_id` naming no entry.
    ///   Nothing is hashed or written in that case.
    /// - `StorageFailure` if the store cannot be read or written. The append
    ///   is not retried.
    pub fn append(&self, new: NewEntry) -> ChainlogResult<LogEntry> {
        validate_new_entry(&new)?;

        let entry = {
            let _guard = self
                .append_lock
                .lock()
                .map_err(|e| ChainlogError::storage(format!("append lock poisoned: {}", e)))?;

            if let Some(target) = new.supersedes_id {
                if self.store.get(target)?.is_none() {
                    return Err(ChainlogError::validation(
                        "supersedes_id",
                        format!("references unknown entry {target}"),
                    ));
                }
            }

            let prev_hash = self.store.latest()?.map(|tail| tail.curr_hash);

            let mut linked = LinkedEntry {
                author: new.author,
                body: new.body,
                node_code: new.node_code,
                input_code: new.input_code,
                tags: new.tags.unwrap_or_default(),
                supersedes_id: new.supersedes_id,
                prev_hash,
                curr_hash: String::new(),
            };
            linked.curr_hash = chain_hash(linked.prev_hash.as_deref(), &linked_payload(&linked));

            debug!(
                prev_hash = ?linked.prev_hash,
                curr_hash = %linked.curr_hash,
                "linking entry onto chain tail"
            );

            let entry = self.store.insert(linked)?;

            info!(
                id = entry.id,
                author = %entry.author,
                curr_hash = %entry.curr_hash,
                "entry appended"
            );

            if let Some(notifier) = &self.notifier {
                notifier.notify(&ChainEvent::Appended {
                    entry: entry.clone(),
                });
            }

            entry
        };

        Ok(entry)
    }

    /// Fetch a single entry.
    pub fn get(&self, id: EntryId) -> ChainlogResult<LogEntry> {
        self.store
            .get(id)?
            .ok_or(ChainlogError::NotFound { id })
    }

    /// The newest entries, newest first.
    ///
    /// `limit` defaults to `ListLimits::default_limit` and must lie within
    /// `1..=ListLimits::max_limit`.
    pub fn list_recent(&self, limit: Option<usize>) -> ChainlogResult<Vec<LogEntry>> {
        let limit = limit.unwrap_or(self.limits.default_limit);
        if limit == 0 || limit > self.limits.max_limit {
            return Err(ChainlogError::validation(
                "limit",
                format!("must be within 1..={}, got {limit}", self.limits.max_limit),
            ));
        }
        self.store.list_recent(limit)
    }

    /// Entries whose `supersedes_id` points at `id`, in chronological order.
    pub fn superseded_by(&self, id: EntryId) -> ChainlogResult<Vec<LogEntry>> {
        self.get(id)?;
        Ok(self
            .store
            .list_chronological(None)?
            .into_iter()
            .filter(|e| e.supersedes_id == Some(id))
            .collect())
    }

    /// Re-walk the whole chain and report every inconsistent entry.
    ///
    /// Only a store read failure is an error; breaks are findings in the
    /// returned report.
    pub fn verify(&self) -> ChainlogResult<IntegrityReport> {
        let entries = self.store.list_chronological(None)?;
        let report = verify_chain(&entries);

        if report.ok {
            info!(count_checked = report.count_checked, "chain verified");
        } else {
            warn!(
                count_checked = report.count_checked,
                bad_ids = ?report.bad_ids,
                "chain verification found breaks"
            );
        }

        Ok(report)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
