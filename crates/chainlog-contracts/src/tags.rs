//! Structured tag values attached to log entries.
//!
//! Tags are part of the hashed payload, so their encoding must be exhaustively
//! defined. `TagValue` is a closed variant type mirroring the JSON data model;
//! maps are `BTreeMap`s so keys always serialize in byte-wise ascending order.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// The tag mapping carried by every entry. Never null: absent tags are an
/// empty map.
pub type Tags = BTreeMap<String, TagValue>;

/// A single JSON-representable tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<TagValue>),
    Map(BTreeMap<String, TagValue>),
}

impl From<Value> for TagValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TagValue::Null,
            Value::Bool(b) => TagValue::Bool(b),
            Value::Number(n) => TagValue::Number(n),
            Value::String(s) => TagValue::String(s),
            Value::Array(items) => TagValue::List(items.into_iter().map(TagValue::from).collect()),
            Value::Object(map) => TagValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, TagValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::String(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::String(s)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        TagValue::Bool(b)
    }
}

impl From<i64> for TagValue {
    fn from(n: i64) -> Self {
        TagValue::Number(n.into())
    }
}

/// Build a `Tags` map from a JSON value.
///
/// `null` becomes an empty map. Any other non-object value is rejected with
/// a description of what was found.
pub fn tags_from_json(value: Value) -> Result<Tags, String> {
    match value {
        Value::Null => Ok(Tags::new()),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, TagValue::from(v)))
            .collect()),
        other => Err(format!("tags must be a JSON object, got {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serde helper: deserialize a possibly-null tag map as an empty map.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Tags, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Tags>::deserialize(deserializer)?.unwrap_or_default())
}
