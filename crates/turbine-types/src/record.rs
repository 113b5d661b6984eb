//! The record envelope handed to user functions.
//!
//! A [`Record`] is a tagged union over a raw payload and a CDC change event.
//! Field access is resolved once per call from the variant: raw records
//! address their payload (or its inner `payload` when schema-wrapped), CDC
//! records address their current image.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cdc::CdcEnvelope;
use crate::error::RecordError;
use crate::path::{self, assign, lookup};
use crate::schema;

/// Addressing mode of a record's `get`/`set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    Raw,
    Cdc,
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raw => "raw",
            Self::Cdc => "cdc",
        })
    }
}

/// Record body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Raw(Value),
    Cdc(CdcEnvelope),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: String,
    timestamp: DateTime<Utc>,
    payload: Payload,
}

impl Record {
    /// A raw record stamped with the current time.
    pub fn raw(key: impl Into<String>, value: Value) -> Self {
        Self::new(key, Payload::Raw(value))
    }

    /// A CDC record stamped with the current time.
    pub fn cdc(key: impl Into<String>, envelope: CdcEnvelope) -> Self {
        Self::new(key, Payload::Cdc(envelope))
    }

    pub fn new(key: impl Into<String>, payload: Payload) -> Self {
        Self {
            key: key.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Build a record from a value as received from a connector, classifying
    /// change events by their wire shape.
    pub fn from_wire(key: impl Into<String>, value: Value, timestamp: DateTime<Utc>) -> Self {
        let payload = match CdcEnvelope::from_wire(value) {
            Ok(envelope) => Payload::Cdc(envelope),
            Err(value) => Payload::Raw(value),
        };
        Self {
            key: key.into(),
            timestamp,
            payload,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn format(&self) -> RecordFormat {
        match self.payload {
            Payload::Raw(_) => RecordFormat::Raw,
            Payload::Cdc(_) => RecordFormat::Cdc,
        }
    }

    pub fn envelope(&self) -> Option<&CdcEnvelope> {
        match &self.payload {
            Payload::Cdc(envelope) => Some(envelope),
            Payload::Raw(_) => None,
        }
    }

    /// Returns `true` for raw payloads carrying a Kafka-Connect style schema.
    pub fn is_schema_wrapped(&self) -> bool {
        matches!(&self.payload, Payload::Raw(v) if schema::is_schema_wrapped(v))
    }

    /// The whole value `get`/`set` address.
    ///
    /// # Errors
    ///
    /// [`RecordError::NoCurrentImage`] for a CDC record with neither image.
    pub fn value(&self) -> Result<&Value, RecordError> {
        match &self.payload {
            Payload::Raw(v) => Ok(schema::data(v)),
            Payload::Cdc(envelope) => {
                envelope
                    .current_image()
                    .ok_or_else(|| RecordError::NoCurrentImage {
                        key: self.key.clone(),
                        operation: envelope.operation,
                    })
            }
        }
    }

    /// Read a field by dotted path.
    ///
    /// # Errors
    ///
    /// [`RecordError::FieldNotFound`] if the path does not resolve,
    /// [`RecordError::NoCurrentImage`] for a CDC record with neither image.
    pub fn get(&self, field: &str) -> Result<&Value, RecordError> {
        lookup(self.value()?, field).ok_or_else(|| RecordError::FieldNotFound {
            key: self.key.clone(),
            field: field.to_string(),
        })
    }

    /// Write a field by dotted path into the same target `get` reads.
    ///
    /// # Errors
    ///
    /// [`RecordError::InvalidPath`] if the path is empty or has an empty
    /// segment, [`RecordError::TypeMismatch`] if the path crosses a non-object
    /// node or the value conflicts with a declared schema type,
    /// [`RecordError::NoCurrentImage`] for a CDC record with neither image.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        if !path::is_valid(field) {
            return Err(RecordError::InvalidPath {
                key: self.key.clone(),
                field: field.to_string(),
            });
        }
        let value = value.into();
        let key = &self.key;
        let mismatch = |expected: &str, found: &str| RecordError::TypeMismatch {
            key: key.clone(),
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        };

        match &mut self.payload {
            Payload::Raw(root) if schema::is_schema_wrapped(root) => {
                let declared = schema::declared_field(root, field);
                if let Some(declared) = &declared {
                    schema::check(declared, &value)
                        .map_err(|found| mismatch(&declared.field_type, found))?;
                }
                let is_new = declared.is_none() && lookup(schema::data(root), field).is_none();
                let inferred = schema::infer_type(&value);
                assign(schema::data_mut(root), field, value)
                    .map_err(|found| mismatch("object", found))?;
                if is_new {
                    schema::append_field(root, field, inferred);
                }
                Ok(())
            }
            Payload::Raw(root) => {
                assign(root, field, value).map_err(|found| mismatch("object", found))
            }
            Payload::Cdc(envelope) => {
                let operation = envelope.operation;
                let image = envelope
                    .current_image_mut()
                    .ok_or_else(|| RecordError::NoCurrentImage {
                        key: key.clone(),
                        operation,
                    })?;
                assign(image, field, value).map_err(|found| mismatch("object", found))
            }
        }
    }

    /// Convert a CDC record to raw, keeping only its current image.
    ///
    /// No-op on raw records. An event with neither image becomes raw `null`.
    pub fn unwrap(&mut self) {
        let payload = std::mem::replace(&mut self.payload, Payload::Raw(Value::Null));
        self.payload = match payload {
            Payload::Cdc(envelope) => {
                Payload::Raw(envelope.into_current_image().unwrap_or(Value::Null))
            }
            raw @ Payload::Raw(_) => raw,
        };
    }

    /// Serialized body for writers: the raw value, or the envelope wire shape.
    pub fn to_value(&self) -> Value {
        match &self.payload {
            Payload::Raw(v) => v.clone(),
            Payload::Cdc(envelope) => envelope.to_wire(),
        }
    }

    pub fn into_value(self) -> Value {
        match self.payload {
            Payload::Raw(v) => v,
            Payload::Cdc(envelope) => envelope.to_wire(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.key, self.format(), self.to_value())
    }
}
