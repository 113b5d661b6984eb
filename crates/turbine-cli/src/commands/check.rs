use anyhow::{Context, Result};
use turbine_engine::config::parser;
use turbine_engine::FixtureConnector;
use turbine_sdk::{App, SecretsProvider};

use crate::CheckArgs;

/// Execute the `check` command: validate app.json, every fixture file, and
/// the secrets the app declares, without running it.
pub(crate) async fn execute<A: App>(app: &A, args: &CheckArgs) -> Result<()> {
    let app_dir = args.app.dir();
    let config = parser::load_app_config(&app_dir, args.app.app_name.as_deref())
        .with_context(|| format!("Failed to load app from {}", app_dir.display()))?;
    let provider = super::secrets_provider(&args.app.secrets)?;

    println!("App '{}'", config.name);
    println!("  Pipeline:  {}", config.pipeline);

    let mut problems = 0_usize;
    for (name, fixture) in &config.resources {
        let connector = FixtureConnector::new(name.as_str(), app_dir.join(fixture));
        match connector.collections().await {
            Ok(collections) => {
                let listed: Vec<String> = collections
                    .iter()
                    .map(|(collection, count)| format!("{collection}={count}"))
                    .collect();
                println!("  Resource:  {name} -> {fixture} ({})", listed.join(", "));
            }
            Err(err) => {
                problems += 1;
                println!("  Resource:  {name} -> {fixture} FAILED: {err}");
            }
        }
    }

    for secret in app.secrets() {
        // Values are never printed, only whether they resolve.
        if provider.lookup(secret).is_some() {
            println!("  Secret:    {secret} resolved");
        } else {
            problems += 1;
            println!("  Secret:    {secret} MISSING");
        }
    }

    tracing::info!(app = %config.name, problems, "App check finished");

    if problems > 0 {
        anyhow::bail!("App '{}' check found {problems} problem(s)", config.name);
    }
    println!("Configuration is valid.");
    Ok(())
}
