//! Fixture-file connector for local runs.
//!
//! A fixture file maps collection names to record lists:
//!
//! ```json
//! { "events": [ { "key": 1, "value": { "operation": "insert", "after": {} }, "timestamp": "2022-03-01T12:00:00Z" } ] }
//! ```
//!
//! Reads return the listed records. Writes are printed to stdout and always
//! succeed, so an app can be exercised end to end without a datastore.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use turbine_sdk::Connector;
use turbine_types::{ConnectorError, Record, RecordOutcome, ResourceConfig};

#[derive(Debug, Deserialize)]
struct FixtureRecord {
    #[serde(default)]
    key: Value,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    timestamp: Option<String>,
}

type FixtureFile = BTreeMap<String, Vec<FixtureRecord>>;

#[derive(Debug, Clone)]
pub struct FixtureConnector {
    resource: String,
    path: PathBuf,
}

impl FixtureConnector {
    pub fn new(resource: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            resource: resource.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Collection names in the fixture file with their record counts.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file is unreadable or malformed.
    pub async fn collections(&self) -> Result<Vec<(String, usize)>, ConnectorError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .map(|(name, records)| (name, records.len()))
            .collect())
    }

    async fn load(&self) -> Result<FixtureFile, ConnectorError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ConnectorError::config(
                "FIXTURE_UNREADABLE",
                format!("cannot read fixture file {}: {e}", self.path.display()),
            )
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ConnectorError::config(
                "FIXTURE_INVALID",
                format!("invalid fixture file {}: {e}", self.path.display()),
            )
        })
    }
}

#[async_trait]
impl Connector for FixtureConnector {
    fn kind(&self) -> &str {
        "fixture"
    }

    async fn read(
        &self,
        collection: &str,
        _config: &ResourceConfig,
    ) -> Result<Vec<Record>, ConnectorError> {
        let mut fixtures = self.load().await?;
        let entries = fixtures.remove(collection).ok_or_else(|| {
            ConnectorError::not_found(
                "COLLECTION_NOT_FOUND",
                format!(
                    "collection '{collection}' not in fixture file {}",
                    self.path.display()
                ),
            )
        })?;
        tracing::debug!(
            resource = %self.resource,
            path = %self.path.display(),
            collection,
            records = entries.len(),
            "Loaded fixtures"
        );
        entries.into_iter().map(into_record).collect()
    }

    async fn write(
        &self,
        collection: &str,
        records: &[Record],
        _config: &ResourceConfig,
    ) -> Result<Vec<RecordOutcome>, ConnectorError> {
        print_stdout(&render_write(&self.resource, collection, records))
            .map_err(|e| ConnectorError::internal("STDOUT", e.to_string()))?;
        Ok(records
            .iter()
            .enumerate()
            .map(|(i, r)| RecordOutcome::written(i, r))
            .collect())
    }
}

fn into_record(entry: FixtureRecord) -> Result<Record, ConnectorError> {
    let key = match entry.key {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let timestamp = match entry.timestamp.as_deref() {
        None | Some("") => Utc::now(),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| {
                ConnectorError::data(
                    "INVALID_TIMESTAMP",
                    format!("record '{key}': timestamp '{raw}' is not RFC 3339: {e}"),
                )
            })?,
    };
    Ok(Record::from_wire(key, entry.value, timestamp))
}

fn print_stdout(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

/// Text printed for a write: a banner, one pretty-printed body per record,
/// and a count line.
pub fn render_write(resource: &str, collection: &str, records: &[Record]) -> String {
    let mut out = format!(
        "=====================to {resource} ({collection}) resource=====================\n"
    );
    for record in records {
        let body = serde_json::to_string_pretty(&record.to_value())
            .unwrap_or_else(|_| record.to_value().to_string());
        out.push_str(&body);
        out.push('\n');
    }
    out.push_str(&format!("{} record(s) written\n", records.len()));
    out
}
