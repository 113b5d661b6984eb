//! Anonymize: read customer orders from a CDC stream, replace each
//! `customer_email` with a marked hash, unwrap the change events, and write
//! the plain rows to an archive collection.

use serde_json::Value;
use turbine_sdk::prelude::*;
use turbine_sdk::types::kind_name;

pub const SOURCE: &str = "source_name";
pub const SOURCE_COLLECTION: &str = "collection_name";
pub const DESTINATION: &str = "destination_name";
pub const DESTINATION_COLLECTION: &str = "collection_archive";

const EMAIL_FIELD: &str = "customer_email";

/// 32-bit djb2-xor hash over UTF-16 code units, walked from the end.
///
/// Matches the widely used `string-hash` npm package, so hashed archives
/// stay comparable with ones produced by JavaScript apps.
pub fn string_hash(s: &str) -> u32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    units
        .iter()
        .rev()
        .fold(5381_u32, |hash, &unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// Wrap a value in `~~~` markers so anonymized fields are easy to spot.
pub fn mark(value: impl std::fmt::Display) -> String {
    format!("~~~{value}~~~")
}

/// Replace `customer_email` on every record and unwrap CDC events.
///
/// # Errors
///
/// Fails on the first record without a string `customer_email`.
pub fn anonymize(mut records: RecordsArray, _ctx: &ProcessContext) -> anyhow::Result<RecordsArray> {
    records.try_for_each(|record| {
        let hashed = match record.get(EMAIL_FIELD)? {
            Value::String(email) => mark(string_hash(email)),
            other => {
                return Err(RecordError::TypeMismatch {
                    key: record.key().to_string(),
                    field: EMAIL_FIELD.to_string(),
                    expected: "string".to_string(),
                    found: kind_name(other).to_string(),
                })
            }
        };
        record.set(EMAIL_FIELD, hashed)
    })?;

    records.unwrap();
    tracing::debug!(records = records.len(), "Anonymized batch");
    Ok(records)
}

pub struct AnonymizeApp;

#[async_trait]
impl App for AnonymizeApp {
    async fn run(&self, turbine: &mut Turbine) -> Result<(), TurbineError> {
        let source = turbine.resources(SOURCE)?;
        let records = source
            .records(SOURCE_COLLECTION, &ResourceConfig::new())
            .await?;

        let anonymized = turbine.process(records, &function("anonymize", anonymize))?;

        let destination = turbine.resources(DESTINATION)?;
        let report = destination
            .write(anonymized, DESTINATION_COLLECTION, &ResourceConfig::new())
            .await?;
        if !report.is_complete() {
            tracing::warn!(
                failed = report.failed_count(),
                "Some anonymized records were not archived"
            );
        }
        Ok(())
    }
}
