//! Process function execution context.
//!
//! `ProcessContext` bundles what a function may read besides its records:
//! the secrets bound for this run and the function's static configuration.
//! Nothing in it is ambient; a function sees exactly what it was handed.

use turbine_types::FunctionConfig;

use crate::secrets::BoundSecrets;

/// Read-only context passed to [`Function::process`](crate::process::Function::process).
///
/// ```ignore
/// let key = ctx.secret("API_KEY").context("API_KEY not bound")?;
/// let salt = ctx.config().get_str("salt").unwrap_or_default();
/// ```
#[derive(Debug, Clone)]
pub struct ProcessContext {
    function: String,
    secrets: BoundSecrets,
    config: FunctionConfig,
}

impl ProcessContext {
    pub fn new(function: impl Into<String>, secrets: BoundSecrets, config: FunctionConfig) -> Self {
        Self {
            function: function.into(),
            secrets,
            config,
        }
    }

    /// Returns the name of the function being invoked.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Returns the value of a bound secret.
    pub fn secret(&self, name: &str) -> Option<&str> {
        self.secrets.get(name)
    }

    pub fn secrets(&self) -> &BoundSecrets {
        &self.secrets
    }

    pub fn config(&self) -> &FunctionConfig {
        &self.config
    }
}
