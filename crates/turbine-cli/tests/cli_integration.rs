//! `start_from` against a temporary app directory.

use std::path::Path;

use async_trait::async_trait;
use turbine_sdk::prelude::*;

struct Passthrough {
    secrets: Vec<&'static str>,
}

#[async_trait]
impl App for Passthrough {
    fn secrets(&self) -> &[&str] {
        &self.secrets
    }

    async fn run(&self, turbine: &mut Turbine) -> Result<(), TurbineError> {
        let records = turbine
            .resources("source")?
            .records("events", &ResourceConfig::new())
            .await?;
        let unwrap = function("unwrap", |mut records, _| {
            records.unwrap();
            Ok(records)
        });
        let out = turbine.process(records, &unwrap)?;
        turbine
            .resources("source")?
            .write(out, "events_archive", &ResourceConfig::new())
            .await?;
        Ok(())
    }
}

fn app_dir(resources: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("app.json"),
        format!(r#"{{"name": "passthrough", "resources": {resources}}}"#),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("events.json"),
        r#"{"events": [{"key": "1", "value": {"operation": "insert", "after": {"id": 1}}}]}"#,
    )
    .unwrap();
    dir
}

fn args<'a>(command: &'a str, dir: &'a Path, extra: &[&'a str]) -> Vec<String> {
    let mut args = vec![
        "passthrough".to_string(),
        command.to_string(),
        "--app-dir".to_string(),
        dir.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    args
}

#[test]
fn run_succeeds_against_fixtures() {
    let dir = app_dir(r#"{"source": "events.json"}"#);
    let app = Passthrough { secrets: vec![] };
    turbine_cli::start_from(app, args("run", dir.path(), &["--output", "json"])).unwrap();
}

#[test]
fn run_reports_app_failure() {
    let dir = app_dir("{}");
    let app = Passthrough { secrets: vec![] };
    let err = turbine_cli::start_from(app, args("run", dir.path(), &[])).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("App 'passthrough' failed"), "{message}");
    assert!(message.contains("resource 'source' not found"), "{message}");
}

#[test]
fn run_rejects_malformed_secret_flag() {
    let dir = app_dir(r#"{"source": "events.json"}"#);
    let app = Passthrough { secrets: vec![] };
    let err = turbine_cli::start_from(app, args("run", dir.path(), &["--secret", "NOEQUALS"]))
        .unwrap_err();
    assert!(format!("{err:#}").contains("Invalid --secret flag"));
}

#[test]
fn check_resolves_secrets_from_flags() {
    let dir = app_dir(r#"{"source": "events.json"}"#);
    let app = Passthrough {
        secrets: vec!["TURBINE_CLI_TEST_KEY"],
    };
    turbine_cli::start_from(
        app,
        args("check", dir.path(), &["--secret", "TURBINE_CLI_TEST_KEY=v"]),
    )
    .unwrap();
}

#[test]
fn check_fails_on_missing_secret_and_fixture() {
    let dir = app_dir(r#"{"source": "events.json", "dest": "missing.json"}"#);
    let app = Passthrough {
        secrets: vec!["TURBINE_CLI_TEST_NEVER_SET"],
    };
    let err = turbine_cli::start_from(app, args("check", dir.path(), &[])).unwrap_err();
    assert!(err.to_string().contains("2 problem(s)"), "{err}");
}
