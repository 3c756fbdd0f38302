//! Log entry types at each stage of an append.
//!
//! - `NewEntry`: what a caller asks to append (unvalidated).
//! - `LinkedEntry`: a validated entry with its chain hashes, handed to storage.
//! - `LogEntry`: the persisted, immutable entry with storage-assigned id and
//!   timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tags::{deserialize_tags, Tags};

/// Storage-assigned, strictly increasing entry identifier.
pub type EntryId = u64;

/// A request to append one entry to the ledger.
///
/// `author` comes from the identity collaborator, never from the client
/// payload. Range checks happen in the ledger, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub node_code: Option<i64>,
    #[serde(default)]
    pub input_code: Option<i64>,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub supersedes_id: Option<EntryId>,
}

impl NewEntry {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_node_code(mut self, code: i64) -> Self {
        self.node_code = Some(code);
        self
    }

    pub fn with_input_code(mut self, code: i64) -> Self {
        self.input_code = Some(code);
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_supersedes(mut self, id: EntryId) -> Self {
        self.supersedes_id = Some(id);
        self
    }
}

/// A validated entry linked into the chain, not yet persisted.
///
/// Storage turns this into a `LogEntry` by assigning `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntry {
    pub author: String,
    pub body: String,
    pub node_code: Option<i64>,
    pub input_code: Option<i64>,
    pub tags: Tags,
    pub supersedes_id: Option<EntryId>,
    pub prev_hash: Option<String>,
    pub curr_hash: String,
}

impl LinkedEntry {
    /// Attach the storage-assigned identity, producing the persisted entry.
    pub fn into_entry(self, id: EntryId, created_at: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id,
            created_at,
            author: self.author,
            body: self.body,
            node_code: self.node_code,
            input_code: self.input_code,
            tags: self.tags,
            supersedes_id: self.supersedes_id,
            prev_hash: self.prev_hash,
            curr_hash: self.curr_hash,
        }
    }
}

/// A persisted entry in the hash chain.
///
/// `curr_hash` commits to `prev_hash` and the six logical fields (`author`,
/// `body`, `node_code`, `input_code`, `tags`, `supersedes_id`). Changing any
/// of them after the fact is detected by chain verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,

    /// Primary chronological ordering key. Ties are broken by `id`.
    pub created_at: DateTime<Utc>,

    pub author: String,
    pub body: String,
    pub node_code: Option<i64>,
    pub input_code: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Tags,

    pub supersedes_id: Option<EntryId>,

    /// `curr_hash` of the preceding entry; `None` only for the genesis entry.
    pub prev_hash: Option<String>,

    /// Lowercase hex SHA-256 over `prev_hash` and the canonical payload.
    pub curr_hash: String,
}

impl LogEntry {
    /// Sort key implementing chronological order with the id tie-break.
    pub fn chronological_key(&self) -> (DateTime<Utc>, EntryId) {
        (self.created_at, self.id)
    }
}
