//! The anonymize app end to end: fixture source, in-memory archive.

use std::path::Path;
use std::sync::Arc;

use anonymize::{AnonymizeApp, DESTINATION, DESTINATION_COLLECTION};
use serde_json::json;
use turbine_engine::config::parser;
use turbine_engine::{ConnectorRegistry, Executor, MemoryConnector};
use turbine_sdk::types::RecordFormat;

fn executor(archive: Arc<MemoryConnector>) -> Executor {
    let app_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let config = parser::load_app_config(app_dir, None).unwrap();
    let registry = ConnectorRegistry::from_config(&config, app_dir).with(DESTINATION, archive);
    Executor::new(config, AnonymizeApp).resolver(registry)
}

#[tokio::test]
async fn archives_hashed_emails_as_raw_rows() {
    let archive = Arc::new(MemoryConnector::new());
    let report = executor(Arc::clone(&archive)).activate().await;

    assert!(report.succeeded(), "{:?}", report.error);
    assert_eq!(report.app, "anonymize");
    assert_eq!(report.pipeline, "turbine-pipeline-anonymize");
    assert!(report.is_clean());

    let rows = archive.written(DESTINATION_COLLECTION);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.format() == RecordFormat::Raw));

    let emails: Vec<_> = rows
        .iter()
        .map(|r| r.get("customer_email").unwrap().clone())
        .collect();
    assert_eq!(
        emails,
        [
            json!("~~~1132583881~~~"),
            json!("~~~1076855632~~~"),
            json!("~~~1083901615~~~"),
        ]
    );
    assert_eq!(rows[0].get("product_name").unwrap(), "Forte 35 Sleeping Bag");
}

#[tokio::test]
async fn partial_archive_failure_is_reported() {
    let archive = Arc::new(MemoryConnector::new());
    archive.fail_on("2");
    let report = executor(Arc::clone(&archive)).activate().await;

    assert!(report.succeeded());
    assert_eq!(report.failed_records(), 1);
    assert_eq!(report.records_written(), 2);
    let keys: Vec<String> = archive
        .written(DESTINATION_COLLECTION)
        .iter()
        .map(|r| r.key().to_string())
        .collect();
    assert_eq!(keys, ["1", "3"]);
}
