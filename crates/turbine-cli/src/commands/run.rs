use std::time::Duration;

use anyhow::{Context, Result};
use turbine_engine::config::parser;
use turbine_engine::{ConnectorRegistry, Executor, RunReport};
use turbine_sdk::App;

use crate::{OutputFormat, RunArgs};

/// Execute the `run` command: load app.json, activate the app, print a summary.
pub(crate) async fn execute<A: App + 'static>(app: A, args: RunArgs) -> Result<()> {
    let app_dir = args.app.dir();

    // 1. Load and validate app.json
    let config = parser::load_app_config(&app_dir, args.app.app_name.as_deref())
        .with_context(|| format!("Failed to load app from {}", app_dir.display()))?;

    tracing::info!(
        app = %config.name,
        pipeline = %config.pipeline,
        resources = config.resources.len(),
        "App config loaded"
    );

    // 2. Wire resources and secrets
    let registry = ConnectorRegistry::from_config(&config, &app_dir);
    let mut executor = Executor::new(config, app)
        .resolver(registry)
        .secrets_provider(super::secrets_provider(&args.app.secrets)?);
    if let Some(secs) = args.timeout_secs {
        executor = executor.deadline(Duration::from_secs(secs));
    }
    if let Some(secs) = args.io_timeout_secs {
        executor = executor.io_timeout(Duration::from_secs(secs));
    }

    // 3. Run
    let mut report = executor.activate().await;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_summary(&report),
    }

    if let Some(err) = report.error.take() {
        return Err(anyhow::Error::new(err).context(format!("App '{}' failed", report.app)));
    }
    if args.fail_on_partial && report.failed_records() > 0 {
        anyhow::bail!(
            "App '{}' left {} record(s) unwritten",
            report.app,
            report.failed_records()
        );
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    match &report.error {
        None => println!("App '{}' completed successfully.", report.app),
        Some(err) => println!("App '{}' failed: {err}", report.app),
    }
    println!("  Pipeline:        {}", report.pipeline);
    println!("  Stages:          {}", report.stages.len());
    for stage in &report.stages {
        match &stage.error {
            None => println!(
                "    {}: {} -> {} records ({:.3}s)",
                stage.function, stage.records_in, stage.records_out, stage.duration_secs
            ),
            Some(err) => println!("    {}: failed on {}: {err}", stage.function, stage.batch),
        }
    }
    println!("  Records written: {}", report.records_written());
    if report.failed_records() > 0 {
        println!("  Records failed:  {}", report.failed_records());
        for write in &report.writes {
            for outcome in write.failures() {
                if let Some(err) = outcome.error() {
                    println!(
                        "    {}/{} record '{}': {err}",
                        write.resource, write.collection, outcome.key
                    );
                }
            }
        }
    }
    println!("  Duration:        {:.2}s", report.duration_secs);
}
