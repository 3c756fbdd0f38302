//! Hash-chain primitives: linking and whole-chain verification.
//!
//! Hash input layout (bytes, in order):
//!   1. prev_hash as UTF-8 bytes (empty for the genesis entry)
//!   2. canonical payload of the entry's six logical fields
//!
//! The digest is SHA-256, rendered as 64 lowercase hex characters.

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use chainlog_contracts::{EntryId, IntegrityReport, LogEntry};

use crate::canonical::entry_payload;

/// Compute the chain hash linking `payload` to its predecessor.
///
/// `None` and `Some("")` hash identically: the genesis entry commits to an
/// empty prefix.
pub fn chain_hash(prev_hash: Option<&str>, payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.unwrap_or("").as_bytes());
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Recompute the hash a stored entry should carry given `prev_hash`.
pub fn expected_hash(prev_hash: Option<&str>, entry: &LogEntry) -> String {
    chain_hash(prev_hash, &entry_payload(entry))
}

/// Sort entries into chronological order: `created_at` ascending, then `id`
/// ascending for entries sharing a timestamp.
pub fn chronological<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Vec<&'a LogEntry> {
    let mut ordered: Vec<&LogEntry> = entries.into_iter().collect();
    ordered.sort_by_key(|e| e.chronological_key());
    ordered
}

/// Verify every entry of a chain and report all inconsistencies.
///
/// The walk runs in chronological order. An entry is flagged when either:
///
/// 1. **Prev-hash linkage**: its `prev_hash` differs from the stored
///    `curr_hash` of the preceding entry (`None` for the first entry).
/// 2. **Hash correctness**: its `curr_hash` differs from the value
///    recomputed from the expected `prev_hash` and its own fields.
///
/// The expected predecessor advances to the *stored* `curr_hash` whether or
/// not the entry was flagged, so one tampered entry does not flag every
/// correctly linked successor. A fork (two entries with the same
/// `prev_hash`) flags the later sibling through rule 1.
///
/// An empty chain is valid.
pub fn verify_chain(entries: &[LogEntry]) -> IntegrityReport {
    let ordered = chronological(entries);

    let mut expected_prev: Option<&str> = None;
    let mut bad_ids: Vec<EntryId> = Vec::new();

    for entry in ordered.iter().copied() {
        let recomputed = expected_hash(expected_prev, entry);

        let link_ok = entry.prev_hash.as_deref() == expected_prev;
        let hash_ok = entry.curr_hash == recomputed;

        if !(link_ok && hash_ok) {
            warn!(
                id = entry.id,
                link_ok,
                hash_ok,
                stored_hash = %entry.curr_hash,
                "chain break detected"
            );
            bad_ids.push(entry.id);
        }

        expected_prev = Some(entry.curr_hash.as_str());
    }

    let head_hash = ordered.last().map(|e| e.curr_hash.clone());

    debug!(
        count_checked = ordered.len(),
        broken = bad_ids.len(),
        "chain verification complete"
    );

    IntegrityReport::new(ordered.len(), bad_ids, head_hash)
}
