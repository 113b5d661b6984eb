pub mod check;
pub mod run;

use anyhow::{Context, Result};
use turbine_engine::{EnvSecretsProvider, LayeredSecretsProvider, StaticSecretsProvider};

/// `--secret NAME=VALUE` flags first, then the process environment.
pub(crate) fn secrets_provider(pairs: &[String]) -> Result<LayeredSecretsProvider> {
    let flags = StaticSecretsProvider::from_pairs(pairs).context("Invalid --secret flag")?;
    Ok(LayeredSecretsProvider::new()
        .layer(flags)
        .layer(EnvSecretsProvider))
}
