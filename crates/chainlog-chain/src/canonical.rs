//! Canonical payload encoding.
//!
//! The payload is a compact JSON object holding exactly the six logical
//! fields of an entry. Encoding rules:
//!
//!   - keys in byte-wise ascending order at every level (`author`, `body`,
//!     `input_code`, `node_code`, `supersedes_id`, `tags` at the top)
//!   - no insignificant whitespace
//!   - non-ASCII text emitted verbatim as UTF-8
//!   - absent optional fields written as explicit `null`
//!
//! id, timestamp and hash fields never enter the payload.

use serde::Serialize;

use chainlog_contracts::{EntryId, LinkedEntry, LogEntry, Tags};

/// The hashed view of an entry. Field declaration order is the sorted key
/// order; serde serializes struct fields in declaration order.
#[derive(Serialize)]
struct CanonicalFields<'a> {
    author: &'a str,
    body: &'a str,
    input_code: Option<i64>,
    node_code: Option<i64>,
    supersedes_id: Option<EntryId>,
    tags: &'a Tags,
}

/// Encode the six logical fields of an entry into canonical bytes.
///
/// `tags = None` is encoded as an empty map. Performs no validation.
///
/// # Panics
///
/// Panics if serialization fails, which cannot happen: every field is a
/// string, integer, or `TagValue` tree with string keys.
pub fn canonical_payload(
    author: &str,
    body: &str,
    node_code: Option<i64>,
    input_code: Option<i64>,
    tags: Option<&Tags>,
    supersedes_id: Option<EntryId>,
) -> Vec<u8> {
    let empty = Tags::new();
    let fields = CanonicalFields {
        author,
        body,
        input_code,
        node_code,
        supersedes_id,
        tags: tags.unwrap_or(&empty),
    };

    // serde_json's compact writer emits no whitespace and leaves non-ASCII
    // characters unescaped. BTreeMap keys come out sorted.
    serde_json::to_vec(&fields).expect("canonical fields must always be serializable to JSON")
}

/// Canonical payload of a persisted entry.
pub fn entry_payload(entry: &LogEntry) -> Vec<u8> {
    canonical_payload(
        &entry.author,
        &entry.body,
        entry.node_code,
        entry.input_code,
        Some(&entry.tags),
        entry.supersedes_id,
    )
}

/// Canonical payload of a linked, not yet persisted entry.
pub fn linked_payload(entry: &LinkedEntry) -> Vec<u8> {
    canonical_payload(
        &entry.author,
        &entry.body,
        entry.node_code,
        entry.input_code,
        Some(&entry.tags),
        entry.supersedes_id,
    )
}
