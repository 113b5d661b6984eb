//! App run result types.

use serde::{Serialize, Serializer};
use turbine_sdk::StageReport;
use turbine_types::{TurbineError, WriteReport};

/// Result of one app activation.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub app: String,
    pub pipeline: String,
    /// `None` if `run` returned `Ok`.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<TurbineError>,
    pub stages: Vec<StageReport>,
    pub writes: Vec<WriteReport>,
    pub duration_secs: f64,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn records_written(&self) -> usize {
        self.writes.iter().map(WriteReport::written_count).sum()
    }

    /// Records rejected across every write of the run.
    pub fn failed_records(&self) -> usize {
        self.writes.iter().map(WriteReport::failed_count).sum()
    }

    /// Returns `true` if the app succeeded and every write was complete.
    pub fn is_clean(&self) -> bool {
        self.succeeded() && self.failed_records() == 0
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<TurbineError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use turbine_types::{ConnectorError, Record, RecordOutcome};

    fn write(rejected: usize) -> WriteReport {
        let records: Vec<Record> = (0..3).map(|i| Record::raw(i.to_string(), json!({}))).collect();
        let outcomes = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                if i < rejected {
                    RecordOutcome::failed(i, r, ConnectorError::data("REJECTED", "no"))
                } else {
                    RecordOutcome::written(i, r)
                }
            })
            .collect();
        WriteReport::reconcile("s3", "archive", &records, outcomes)
    }

    fn report(writes: Vec<WriteReport>, error: Option<TurbineError>) -> RunReport {
        RunReport {
            app: "demo".into(),
            pipeline: "turbine-pipeline-demo".into(),
            error,
            stages: Vec::new(),
            writes,
            duration_secs: 0.5,
        }
    }

    #[test]
    fn counts_across_writes() {
        let run = report(vec![write(0), write(2)], None);
        assert_eq!(run.records_written(), 4);
        assert_eq!(run.failed_records(), 2);
        assert!(run.succeeded());
        assert!(!run.is_clean());
    }

    #[test]
    fn serializes_error_as_message() {
        let run = report(
            Vec::new(),
            Some(TurbineError::ResourceNotFound {
                resource: "pg".into(),
            }),
        );
        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["error"], "resource 'pg' not found");
        assert_eq!(value["app"], "demo");

        let clean = serde_json::to_value(report(vec![write(0)], None)).unwrap();
        assert!(clean["error"].is_null());
    }
}
