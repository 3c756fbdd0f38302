//! Integrity report and notification event types.

use serde::{Deserialize, Serialize};

use crate::entry::{EntryId, LogEntry};

/// The outcome of a whole-chain verification pass.
///
/// A report is always complete: every inconsistent id is listed, not only
/// the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// True only if no entry was flagged.
    pub ok: bool,

    pub message: String,

    /// Number of entries walked.
    pub count_checked: usize,

    /// Flagged ids in chronological order. Omitted from JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bad_ids: Vec<EntryId>,

    /// Stored `curr_hash` of the last entry walked; a compact commitment to
    /// the verified chain. Absent for an empty chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_hash: Option<String>,
}

impl IntegrityReport {
    pub const VALID_MESSAGE: &'static str = "chain valid";
    pub const BROKEN_MESSAGE: &'static str = "chain breaks detected";

    /// Build a report from the walk results, deriving `ok` and `message`.
    pub fn new(count_checked: usize, bad_ids: Vec<EntryId>, head_hash: Option<String>) -> Self {
        let ok = bad_ids.is_empty();
        let message = if ok {
            Self::VALID_MESSAGE
        } else {
            Self::BROKEN_MESSAGE
        };
        Self {
            ok,
            message: message.to_string(),
            count_checked,
            bad_ids,
            head_hash,
        }
    }
}

/// Event published to the notification collaborator.
///
/// Serialized as `{"type": "appended", "entry": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainEvent {
    /// An entry was durably appended.
    Appended { entry: LogEntry },
}
