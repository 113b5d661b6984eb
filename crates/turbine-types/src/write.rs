//! Per-record write results.
//!
//! A write never collapses into a single boolean: every input record gets
//! its own [`RecordOutcome`], so the executor can decide on retry or
//! dead-lettering for exactly the records that failed.

use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::record::Record;

/// Result of writing one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteStatus {
    Written,
    Failed { error: ConnectorError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Position of the record in the written array.
    pub index: usize,
    pub key: String,
    #[serde(flatten)]
    pub status: WriteStatus,
}

impl RecordOutcome {
    pub fn written(index: usize, record: &Record) -> Self {
        Self {
            index,
            key: record.key().to_string(),
            status: WriteStatus::Written,
        }
    }

    pub fn failed(index: usize, record: &Record, error: ConnectorError) -> Self {
        Self {
            index,
            key: record.key().to_string(),
            status: WriteStatus::Failed { error },
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self.status, WriteStatus::Written)
    }

    pub fn error(&self) -> Option<&ConnectorError> {
        match &self.status {
            WriteStatus::Written => None,
            WriteStatus::Failed { error } => Some(error),
        }
    }
}

/// Outcome of a whole `write` call, one entry per input record in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
    pub resource: String,
    pub collection: String,
    pub outcomes: Vec<RecordOutcome>,
}

impl WriteReport {
    /// Align connector-reported outcomes with the records that were written.
    ///
    /// The result has exactly one outcome per record. An index the connector
    /// did not report is marked failed; out-of-range and duplicate indices
    /// are ignored (first report wins).
    pub fn reconcile(
        resource: impl Into<String>,
        collection: impl Into<String>,
        records: &[Record],
        reported: Vec<RecordOutcome>,
    ) -> Self {
        let mut slots: Vec<Option<RecordOutcome>> = vec![None; records.len()];
        for outcome in reported {
            if let Some(slot @ None) = slots.get_mut(outcome.index) {
                *slot = Some(outcome);
            }
        }
        let outcomes = slots
            .into_iter()
            .zip(records)
            .enumerate()
            .map(|(index, (slot, record))| {
                slot.map(|mut outcome| {
                    outcome.key = record.key().to_string();
                    outcome
                })
                .unwrap_or_else(|| {
                    RecordOutcome::failed(
                        index,
                        record,
                        ConnectorError::internal(
                            "MISSING_OUTCOME",
                            "connector did not report an outcome for this record",
                        ),
                    )
                })
            })
            .collect();
        Self {
            resource: resource.into(),
            collection: collection.into(),
            outcomes,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn written_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_written()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.written_count()
    }

    /// Returns `true` if every record was written.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(RecordOutcome::is_written)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| !o.is_written())
    }
}
