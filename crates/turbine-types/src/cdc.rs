//! Change-data-capture envelope as emitted by CDC-capable sources.
//!
//! Wire shape: `{ "operation", "before", "after", "metadata" }`. Debezium-style
//! `op` codes (`c`, `u`, `d`, `r`) are accepted as aliases.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of change carried by a CDC event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[serde(alias = "c", alias = "r", alias = "create", alias = "read")]
    Insert,
    #[serde(alias = "u")]
    Update,
    #[serde(alias = "d")]
    Delete,
    #[serde(other)]
    Unknown,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source metadata attached to a change event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdcMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    /// Connector-specific members (table, lsn, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdcEnvelope {
    #[serde(alias = "op")]
    pub operation: Operation,
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub after: Option<Value>,
    #[serde(default)]
    pub metadata: CdcMetadata,
}

impl CdcEnvelope {
    #[must_use]
    pub fn new(operation: Operation, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            operation,
            before,
            after,
            metadata: CdcMetadata::default(),
        }
    }

    #[must_use]
    pub fn insert(after: Value) -> Self {
        Self::new(Operation::Insert, None, Some(after))
    }

    #[must_use]
    pub fn update(before: Option<Value>, after: Value) -> Self {
        Self::new(Operation::Update, before, Some(after))
    }

    #[must_use]
    pub fn delete(before: Value) -> Self {
        Self::new(Operation::Delete, Some(before), None)
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: CdcMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The image field access resolves to: `after`, else `before`.
    #[must_use]
    pub fn current_image(&self) -> Option<&Value> {
        self.after.as_ref().or(self.before.as_ref())
    }

    pub fn current_image_mut(&mut self) -> Option<&mut Value> {
        match (&mut self.after, &mut self.before) {
            (Some(after), _) => Some(after),
            (None, Some(before)) => Some(before),
            (None, None) => None,
        }
    }

    #[must_use]
    pub fn into_current_image(self) -> Option<Value> {
        self.after.or(self.before)
    }

    /// Returns `true` if `value` looks like a change event on the wire.
    #[must_use]
    pub fn is_envelope_shape(value: &Value) -> bool {
        let Some(obj) = value.as_object() else {
            return false;
        };
        let has_op = obj.get("operation").or_else(|| obj.get("op")).is_some_and(Value::is_string);
        has_op && (obj.contains_key("after") || obj.contains_key("before"))
    }

    /// Parse a wire value, returning it unchanged if it is not an envelope.
    ///
    /// # Errors
    ///
    /// Returns the original value when it does not deserialize as an envelope.
    pub fn from_wire(value: Value) -> Result<Self, Value> {
        if !Self::is_envelope_shape(&value) {
            return Err(value);
        }
        serde_json::from_value(value.clone()).map_err(|_| value)
    }

    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("operation".into(), Value::String(self.operation.as_str().into()));
        obj.insert("before".into(), self.before.clone().unwrap_or(Value::Null));
        obj.insert("after".into(), self.after.clone().unwrap_or(Value::Null));
        let metadata = serde_json::to_value(&self.metadata).unwrap_or(Value::Null);
        obj.insert("metadata".into(), metadata);
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("insert", Operation::Insert)]
    #[case("update", Operation::Update)]
    #[case("delete", Operation::Delete)]
    #[case("c", Operation::Insert)]
    #[case("r", Operation::Insert)]
    #[case("u", Operation::Update)]
    #[case("d", Operation::Delete)]
    #[case("truncate", Operation::Unknown)]
    fn operation_wire_names(#[case] wire: &str, #[case] expected: Operation) {
        let op: Operation = serde_json::from_value(json!(wire)).unwrap();
        assert_eq!(op, expected);
    }

    #[test]
    fn current_image_prefers_after() {
        let env = CdcEnvelope::update(Some(json!({"v": 1})), json!({"v": 2}));
        assert_eq!(env.current_image(), Some(&json!({"v": 2})));
    }

    #[test]
    fn current_image_falls_back_to_before_for_deletes() {
        let env = CdcEnvelope::delete(json!({"v": 1}));
        assert_eq!(env.current_image(), Some(&json!({"v": 1})));
        assert_eq!(env.into_current_image(), Some(json!({"v": 1})));
    }

    #[test]
    fn malformed_delete_has_no_image() {
        let mut env = CdcEnvelope::new(Operation::Delete, None, None);
        assert!(env.current_image().is_none());
        assert!(env.current_image_mut().is_none());
    }

    #[test]
    fn from_wire_parses_envelope_and_metadata() {
        let wire = json!({
            "operation": "update",
            "before": null,
            "after": {"id": 1},
            "metadata": {"timestamp": "2024-01-15T10:30:00Z", "key": 1, "table": "users"}
        });
        let env = CdcEnvelope::from_wire(wire).unwrap();
        assert_eq!(env.operation, Operation::Update);
        assert!(env.before.is_none());
        assert_eq!(env.metadata.key, Some(json!(1)));
        assert_eq!(env.metadata.extra.get("table"), Some(&json!("users")));
        assert!(env.metadata.timestamp.is_some());
    }

    #[test]
    fn from_wire_accepts_debezium_op() {
        let env = CdcEnvelope::from_wire(json!({"op": "d", "before": {"id": 9}})).unwrap();
        assert_eq!(env.operation, Operation::Delete);
    }

    #[test]
    fn from_wire_rejects_plain_objects() {
        let plain = json!({"operation": "update", "id": 1});
        assert_eq!(CdcEnvelope::from_wire(plain.clone()), Err(plain));
        assert!(CdcEnvelope::from_wire(json!("scalar")).is_err());
    }

    #[test]
    fn to_wire_emits_the_documented_shape() {
        let env = CdcEnvelope::insert(json!({"id": 1}));
        let wire = env.to_wire();
        assert_eq!(wire["operation"], "insert");
        assert_eq!(wire["before"], Value::Null);
        assert_eq!(wire["after"], json!({"id": 1}));
        assert!(wire["metadata"].is_object());
    }
}
