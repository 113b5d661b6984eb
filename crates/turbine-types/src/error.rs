//! Error taxonomy for records, connectors, and process invocations.
//!
//! [`ConnectorError`] is what connector implementations report: it carries a
//! classification and a retry hint. [`RecordError`] is raised by field access
//! on a single record. [`TurbineError`] is what reaches the executor.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cdc::Operation;

/// Broad classification of a connector error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid connector configuration.
    Config,
    /// Authentication failure.
    Auth,
    /// Insufficient permissions.
    Permission,
    /// Rate limit exceeded (retryable).
    RateLimit,
    /// Transient transport error (retryable).
    TransientNetwork,
    /// The addressed collection does not exist.
    NotFound,
    /// A record was rejected by the datastore.
    Data,
    /// Internal connector error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Config => "config",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::RateLimit => "rate_limit",
            Self::TransientNetwork => "transient_network",
            Self::NotFound => "not_found",
            Self::Data => "data",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Blast radius of a connector error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    /// Affects the whole read or write call.
    Call,
    /// Affects an individual record.
    Record,
}

impl fmt::Display for ErrorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Call => "call",
            Self::Record => "record",
        };
        f.write_str(s)
    }
}

/// Structured error from a connector operation.
///
/// Construct via category-specific factory methods (e.g., [`ConnectorError::auth`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{category}] {code}: {message}")]
pub struct ConnectorError {
    pub category: ErrorCategory,
    pub scope: ErrorScope,
    pub code: String,
    pub message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ConnectorError {
    fn new(
        category: ErrorCategory,
        scope: ErrorScope,
        retryable: bool,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            scope,
            code: code.into(),
            message: message.into(),
            retryable,
            retry_after_ms: None,
            details: None,
        }
    }

    /// Configuration error (not retryable).
    #[must_use]
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Config, ErrorScope::Call, false, code, message)
    }

    /// Authentication error (not retryable).
    #[must_use]
    pub fn auth(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Auth, ErrorScope::Call, false, code, message)
    }

    /// Permission error (not retryable).
    #[must_use]
    pub fn permission(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Permission, ErrorScope::Call, false, code, message)
    }

    /// Rate limit error (retryable).
    #[must_use]
    pub fn rate_limit(
        code: impl Into<String>,
        message: impl Into<String>,
        retry_after_ms: Option<u64>,
    ) -> Self {
        let mut err = Self::new(ErrorCategory::RateLimit, ErrorScope::Call, true, code, message);
        err.retry_after_ms = retry_after_ms;
        err
    }

    /// Transient transport error (retryable).
    #[must_use]
    pub fn transient_network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::TransientNetwork, ErrorScope::Call, true, code, message)
    }

    /// Missing collection (not retryable).
    #[must_use]
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, ErrorScope::Call, false, code, message)
    }

    /// Rejected record (not retryable, record scope).
    #[must_use]
    pub fn data(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Data, ErrorScope::Record, false, code, message)
    }

    /// Internal connector error (not retryable).
    #[must_use]
    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Internal, ErrorScope::Call, false, code, message)
    }

    /// Attach structured diagnostic details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the default error scope.
    #[must_use]
    pub fn with_scope(mut self, scope: ErrorScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Field access failure on a single record.
///
/// Every variant carries the key of the offending record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record '{key}': field '{field}' not found")]
    FieldNotFound { key: String, field: String },

    #[error("record '{key}': field path '{field}' has an empty segment")]
    InvalidPath { key: String, field: String },

    #[error("record '{key}': {operation} event has neither an after nor a before image")]
    NoCurrentImage { key: String, operation: Operation },

    #[error("record '{key}': field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        key: String,
        field: String,
        expected: String,
        found: String,
    },
}

impl RecordError {
    /// Key of the record the error was raised on.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::FieldNotFound { key, .. }
            | Self::InvalidPath { key, .. }
            | Self::NoCurrentImage { key, .. }
            | Self::TypeMismatch { key, .. } => key,
        }
    }

    /// Field name involved, if the error concerns a specific field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::FieldNotFound { field, .. }
            | Self::InvalidPath { field, .. }
            | Self::TypeMismatch { field, .. } => Some(field),
            Self::NoCurrentImage { .. } => None,
        }
    }
}

/// Resource I/O direction, used in cancellation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoOperation {
    Read,
    Write,
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// Identifies the input batch of a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    pub records: usize,
}

impl fmt::Display for BatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stream {
            Some(stream) => write!(f, "batch '{stream}' ({} records)", self.records),
            None => write!(f, "unnamed batch ({} records)", self.records),
        }
    }
}

/// Errors surfaced to the executor.
///
/// Resource and secret failures propagate unmodified; the runtime never
/// retries. A partially failed write is not an error, see
/// [`WriteReport`](crate::write::WriteReport).
#[derive(Debug, thiserror::Error)]
pub enum TurbineError {
    #[error("resource '{resource}' not found")]
    ResourceNotFound { resource: String },

    #[error("collection '{collection}' not found on resource '{resource}'")]
    CollectionNotFound { resource: String, collection: String },

    #[error("resource '{resource}': {source}")]
    Connector {
        resource: String,
        #[source]
        source: ConnectorError,
    },

    #[error("function '{function}' failed on {batch}: {source}")]
    Record {
        function: String,
        batch: BatchRef,
        #[source]
        source: RecordError,
    },

    #[error("unresolved secret(s): {}", .names.join(", "))]
    SecretUnresolved { names: Vec<String> },

    #[error("{operation} on resource '{resource}' was cancelled")]
    Cancelled {
        resource: String,
        operation: IoOperation,
    },

    #[error("function '{function}' failed on {batch}: {message}")]
    ProcessFunction {
        function: String,
        batch: BatchRef,
        message: String,
    },
}

impl TurbineError {
    /// Returns `true` only for connector errors flagged retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connector { source, .. } => source.retryable,
            _ => false,
        }
    }

    /// Returns the typed connector error if this is a `Connector` variant.
    #[must_use]
    pub fn as_connector_error(&self) -> Option<&ConnectorError> {
        match self {
            Self::Connector { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the record-level error if user code failed on a field access.
    #[must_use]
    pub fn record_error(&self) -> Option<&RecordError> {
        match self {
            Self::Record { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_defaults() {
        let err = ConnectorError::auth("BAD_TOKEN", "token expired");
        assert_eq!(err.category, ErrorCategory::Auth);
        assert_eq!(err.scope, ErrorScope::Call);
        assert!(!err.retryable);
    }

    #[test]
    fn transient_errors_are_retryable() {
        let net = ConnectorError::transient_network("TIMEOUT", "timed out");
        assert!(net.retryable);

        let limited = ConnectorError::rate_limit("THROTTLED", "slow down", Some(250));
        assert!(limited.retryable);
        assert_eq!(limited.retry_after_ms, Some(250));
    }

    #[test]
    fn data_errors_are_record_scoped() {
        let err = ConnectorError::data("REJECTED", "constraint violation");
        assert_eq!(err.scope, ErrorScope::Record);
    }

    #[test]
    fn serde_roundtrip() {
        let err = ConnectorError::transient_network("RESET", "connection reset")
            .with_details(serde_json::json!({"host": "db.internal"}));
        let json = serde_json::to_string(&err).unwrap();
        let back: ConnectorError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn display_format() {
        let err = ConnectorError::config("BAD_PORT", "port must be positive");
        assert_eq!(err.to_string(), "[config] BAD_PORT: port must be positive");
    }

    #[test]
    fn record_error_exposes_identity() {
        let err = RecordError::FieldNotFound {
            key: "42".into(),
            field: "customer_email".into(),
        };
        assert_eq!(err.key(), "42");
        assert_eq!(err.field(), Some("customer_email"));
        assert_eq!(
            err.to_string(),
            "record '42': field 'customer_email' not found"
        );
    }

    #[test]
    fn no_current_image_has_no_field() {
        let err = RecordError::NoCurrentImage {
            key: "7".into(),
            operation: Operation::Delete,
        };
        assert_eq!(err.field(), None);
        assert!(err.to_string().contains("delete"));
    }

    #[test]
    fn secret_unresolved_lists_every_name() {
        let err = TurbineError::SecretUnresolved {
            names: vec!["API_KEY".into(), "PGPASS".into()],
        };
        assert_eq!(err.to_string(), "unresolved secret(s): API_KEY, PGPASS");
    }

    #[test]
    fn only_retryable_connector_errors_are_retryable() {
        let retryable = TurbineError::Connector {
            resource: "pg".into(),
            source: ConnectorError::transient_network("RESET", "reset"),
        };
        assert!(retryable.is_retryable());
        assert!(retryable.as_connector_error().is_some());

        let cancelled = TurbineError::Cancelled {
            resource: "pg".into(),
            operation: IoOperation::Read,
        };
        assert!(!cancelled.is_retryable());
        assert_eq!(cancelled.to_string(), "read on resource 'pg' was cancelled");
    }

    #[test]
    fn batch_ref_display() {
        let named = BatchRef {
            stream: Some("pg/users".into()),
            records: 3,
        };
        assert_eq!(named.to_string(), "batch 'pg/users' (3 records)");

        let unnamed = BatchRef {
            stream: None,
            records: 0,
        };
        assert_eq!(unnamed.to_string(), "unnamed batch (0 records)");
    }
}
