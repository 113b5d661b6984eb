//! Schema-wrapped payloads in Kafka-Connect JSON form.
//!
//! ```json
//! { "schema": { "type": "struct", "fields": [ { "field": "id", "type": "int32", "optional": false } ] },
//!   "payload": { "id": 1 } }
//! ```
//!
//! Field access on such a payload addresses `payload`; writes are checked
//! against the declared field types and new fields are appended to the schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::kind_name;

/// One entry of `schema.fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub optional: bool,
}

/// Returns `true` if `value` carries both a `schema` object and a `payload`.
#[must_use]
pub fn is_schema_wrapped(value: &Value) -> bool {
    value.get("schema").is_some_and(Value::is_object) && value.get("payload").is_some()
}

/// The data part of a payload: `payload` when wrapped, the value itself otherwise.
#[must_use]
pub fn data(value: &Value) -> &Value {
    if is_schema_wrapped(value) {
        &value["payload"]
    } else {
        value
    }
}

pub(crate) fn data_mut(value: &mut Value) -> &mut Value {
    if is_schema_wrapped(value) {
        &mut value["payload"]
    } else {
        value
    }
}

/// Look up the declared schema entry for `field` (matched on the full dotted name).
#[must_use]
pub fn declared_field(value: &Value, field: &str) -> Option<SchemaField> {
    value
        .get("schema")?
        .get("fields")?
        .as_array()?
        .iter()
        .filter_map(|f| serde_json::from_value::<SchemaField>(f.clone()).ok())
        .find(|f| f.field == field)
}

/// Check `value` against a declared field type.
///
/// Returns the found kind on mismatch. Unknown type names accept anything.
pub(crate) fn check(declared: &SchemaField, value: &Value) -> Result<(), &'static str> {
    if value.is_null() {
        return if declared.optional { Ok(()) } else { Err("null") };
    }
    let ok = match declared.field_type.as_str() {
        "string" | "bytes" => value.is_string(),
        "boolean" => value.is_boolean(),
        "int8" => int_in_range(value, i64::from(i8::MIN), i64::from(i8::MAX)),
        "int16" => int_in_range(value, i64::from(i16::MIN), i64::from(i16::MAX)),
        "int32" => int_in_range(value, i64::from(i32::MIN), i64::from(i32::MAX)),
        "int64" => value.is_i64() || value.is_u64(),
        "float32" | "float64" => value.is_number(),
        "struct" | "map" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(kind_name(value))
    }
}

fn int_in_range(value: &Value, min: i64, max: i64) -> bool {
    value.as_i64().is_some_and(|n| (min..=max).contains(&n))
}

/// Kafka-Connect type name inferred from a JSON value.
#[must_use]
pub fn infer_type(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => "int32",
            Some(_) => "int64",
            None if n.is_u64() => "int64",
            None => "float64",
        },
        Value::Object(_) => "struct",
        Value::Array(_) => "array",
        Value::Null => "unsupported",
    }
}

/// Append an optional field declaration to `schema.fields`.
pub(crate) fn append_field(value: &mut Value, field: &str, field_type: &str) {
    let Some(schema) = value.get_mut("schema").and_then(Value::as_object_mut) else {
        return;
    };
    let fields = schema
        .entry("fields")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !fields.is_array() {
        *fields = Value::Array(Vec::new());
    }
    if let Value::Array(items) = fields {
        let mut entry = Map::new();
        entry.insert("field".into(), Value::String(field.to_string()));
        entry.insert("optional".into(), Value::Bool(true));
        entry.insert("type".into(), Value::String(field_type.to_string()));
        items.push(Value::Object(entry));
    }
}
