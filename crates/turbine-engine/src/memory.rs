//! In-memory connector.
//!
//! Holds collections in a map and records every successful write. Faults can
//! be injected per record key or for all reads, which makes it the
//! destination of choice for tests that exercise partial writes.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use turbine_sdk::Connector;
use turbine_types::{ConnectorError, Record, RecordOutcome, ResourceConfig};

#[derive(Debug, Default)]
pub struct MemoryConnector {
    collections: Mutex<BTreeMap<String, Vec<Record>>>,
    failing_keys: Mutex<BTreeSet<String>>,
    read_error: Mutex<Option<ConnectorError>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `collection` with `records`.
    #[must_use]
    pub fn with_collection(self, collection: impl Into<String>, records: Vec<Record>) -> Self {
        self.collections.lock().insert(collection.into(), records);
        self
    }

    /// Reject every future write of a record with this key.
    pub fn fail_on(&self, key: impl Into<String>) {
        self.failing_keys.lock().insert(key.into());
    }

    /// Make every future read fail with `error`.
    pub fn fail_reads(&self, error: ConnectorError) {
        *self.read_error.lock() = Some(error);
    }

    /// Records currently stored in `collection`.
    pub fn written(&self, collection: &str) -> Vec<Record> {
        self.collections
            .lock()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn collections(&self) -> Vec<String> {
        self.collections.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn kind(&self) -> &str {
        "memory"
    }

    async fn read(
        &self,
        collection: &str,
        _config: &ResourceConfig,
    ) -> Result<Vec<Record>, ConnectorError> {
        if let Some(err) = self.read_error.lock().clone() {
            return Err(err);
        }
        self.collections
            .lock()
            .get(collection)
            .cloned()
            .ok_or_else(|| {
                ConnectorError::not_found(
                    "COLLECTION_NOT_FOUND",
                    format!("collection '{collection}' does not exist"),
                )
            })
    }

    async fn write(
        &self,
        collection: &str,
        records: &[Record],
        _config: &ResourceConfig,
    ) -> Result<Vec<RecordOutcome>, ConnectorError> {
        let failing = self.failing_keys.lock().clone();
        let mut collections = self.collections.lock();
        let stored = collections.entry(collection.to_string()).or_default();

        let outcomes = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if failing.contains(record.key()) {
                    RecordOutcome::failed(
                        i,
                        record,
                        ConnectorError::data(
                            "REJECTED",
                            format!("record '{}' rejected by injected fault", record.key()),
                        ),
                    )
                } else {
                    stored.push(record.clone());
                    RecordOutcome::written(i, record)
                }
            })
            .collect();
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use turbine_types::ErrorCategory;

    fn records() -> Vec<Record> {
        (1..=3)
            .map(|i| Record::raw(i.to_string(), json!({"id": i})))
            .collect()
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let memory = MemoryConnector::new();
        let written = records();
        let outcomes = memory
            .write("archive", &written, &ResourceConfig::new())
            .await
            .unwrap();
        assert!(outcomes.iter().all(RecordOutcome::is_written));

        let back = memory.read("archive", &ResourceConfig::new()).await.unwrap();
        assert_eq!(back, written);
        assert_eq!(memory.collections(), ["archive"]);
    }

    #[tokio::test]
    async fn injected_key_fault_fails_only_that_record() {
        let memory = MemoryConnector::new();
        memory.fail_on("2");
        let outcomes = memory
            .write("archive", &records(), &ResourceConfig::new())
            .await
            .unwrap();
        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| !o.is_written())
            .map(|o| o.key.as_str())
            .collect();
        assert_eq!(failed, ["2"]);
        assert_eq!(memory.written("archive").len(), 2);
    }

    #[tokio::test]
    async fn read_faults_and_missing_collections() {
        let memory = MemoryConnector::new().with_collection("users", records());
        let err = memory.read("orders", &ResourceConfig::new()).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::NotFound);

        memory.fail_reads(ConnectorError::transient_network("RESET", "connection reset"));
        let err = memory.read("users", &ResourceConfig::new()).await.unwrap_err();
        assert!(err.retryable);
    }
}
