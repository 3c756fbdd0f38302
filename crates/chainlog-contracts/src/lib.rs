//! # chainlog-contracts
//!
//! Shared types, reports, events, and errors for the chainlog ledger.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod entry;
pub mod error;
pub mod report;
pub mod tags;

pub use entry::{EntryId, LinkedEntry, LogEntry, NewEntry};
pub use error::{ChainlogError, ChainlogResult};
pub use report::{ChainEvent, IntegrityReport};
pub use tags::{TagValue, Tags};

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn sample_entry() -> LogEntry {
        LinkedEntry {
            author: "alice".to_string(),
            body: "opened valve".to_string(),
            node_code: Some(12),
            input_code: None,
            tags: Tags::new(),
            supersedes_id: None,
            prev_hash: None,
            curr_hash: "ab".repeat(32),
        }
        .into_entry(1, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    // ── TagValue ─────────────────────────────────────────────────────────────

    #[test]
    fn tag_value_from_json_covers_every_variant() {
        let value = TagValue::from(json!({
            "s": "x",
            "n": 3,
            "f": 1.5,
            "b": true,
            "z": null,
            "l": [1, "two"],
            "m": { "inner": false }
        }));

        let TagValue::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["s"], TagValue::String("x".to_string()));
        assert_eq!(map["n"], TagValue::from(3_i64));
        assert_eq!(map["b"], TagValue::Bool(true));
        assert_eq!(map["z"], TagValue::Null);
        assert!(matches!(map["f"], TagValue::Number(_)));
        assert!(matches!(&map["l"], TagValue::List(items) if items.len() == 2));
        assert!(matches!(&map["m"], TagValue::Map(inner) if inner.contains_key("inner")));
    }

    #[test]
    fn tag_value_deserializes_from_plain_json() {
        let tags: Tags = serde_json::from_str(r#"{"k":[null,true,7,"v",{"a":1}]}"#).unwrap();
        let expected = TagValue::List(vec![
            TagValue::Null,
            TagValue::Bool(true),
            TagValue::from(7_i64),
            TagValue::from("v"),
            TagValue::from(json!({ "a": 1 })),
        ]);
        assert_eq!(tags["k"], expected);
    }

    #[test]
    fn tags_from_json_normalizes_null_and_rejects_scalars() {
        assert!(tags::tags_from_json(json!(null)).unwrap().is_empty());
        assert_eq!(tags::tags_from_json(json!({ "a": 1 })).unwrap().len(), 1);

        let err = tags::tags_from_json(json!([1, 2])).unwrap_err();
        assert!(err.contains("an array"), "unexpected message: {err}");
    }

    // ── LogEntry serde ───────────────────────────────────────────────────────

    #[test]
    fn log_entry_null_tags_load_as_empty_map() {
        let mut raw = serde_json::to_value(sample_entry()).unwrap();
        raw["tags"] = json!(null);

        let entry: LogEntry = serde_json::from_value(raw).unwrap();
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn log_entry_missing_tags_load_as_empty_map() {
        let mut raw = serde_json::to_value(sample_entry()).unwrap();
        raw.as_object_mut().unwrap().remove("tags");

        let entry: LogEntry = serde_json::from_value(raw).unwrap();
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn new_entry_builder_sets_optional_fields() {
        let entry = NewEntry::new("bob", "note")
            .with_node_code(4)
            .with_input_code(250)
            .with_supersedes(9);

        assert_eq!(entry.node_code, Some(4));
        assert_eq!(entry.input_code, Some(250));
        assert_eq!(entry.supersedes_id, Some(9));
        assert!(entry.tags.is_none());
    }

    // ── IntegrityReport ──────────────────────────────────────────────────────

    #[test]
    fn report_ok_omits_bad_ids() {
        let report = IntegrityReport::new(3, vec![], Some("cd".repeat(32)));
        assert!(report.ok);
        assert_eq!(report.message, IntegrityReport::VALID_MESSAGE);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("bad_ids").is_none());
        assert_eq!(json["count_checked"], 3);
    }

    #[test]
    fn report_with_breaks_is_not_ok() {
        let report = IntegrityReport::new(5, vec![2, 4], None);
        assert!(!report.ok);
        assert_eq!(report.message, IntegrityReport::BROKEN_MESSAGE);
        assert_eq!(report.bad_ids, vec![2, 4]);
    }

    // ── ChainEvent ───────────────────────────────────────────────────────────

    #[test]
    fn appended_event_is_type_tagged() {
        let event = ChainEvent::Appended { entry: sample_entry() };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "appended");
        assert_eq!(json["entry"]["id"], 1);
        assert_eq!(json["entry"]["author"], "alice");
    }

    // ── ChainlogError display messages ───────────────────────────────────────

    #[test]
    fn error_validation_display() {
        let err = ChainlogError::validation("node_code", "must be within 0..=99, got 100");
        let msg = err.to_string();
        assert!(msg.contains("node_code"));
        assert!(msg.contains("0..=99"));
    }

    #[test]
    fn error_not_found_display() {
        let err = ChainlogError::NotFound { id: 42 };
        assert_eq!(err.to_string(), "log entry 42 not found");
    }

    #[test]
    fn error_storage_failure_display() {
        let msg = ChainlogError::storage("disk full").to_string();
        assert!(msg.contains("storage failure"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn error_config_display() {
        let err = ChainlogError::ConfigError {
            reason: "missing store path".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
    }
}
