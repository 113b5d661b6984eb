//! `app.json` model.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Validation failures of an app configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("application name is required in app.json")]
    MissingName,

    #[error("resource '{resource}' has an empty fixture path")]
    EmptyFixturePath { resource: String },

    #[error("expected NAME=VALUE, got '{entry}'")]
    InvalidSecretPair { entry: String },
}

/// Contents of an app's `app.json`.
///
/// ```json
/// {
///   "name": "anonymize",
///   "environment": "common",
///   "resources": { "source_name": "fixtures/demo-cdc.json" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Defaults to `turbine-pipeline-{name}` when empty.
    #[serde(default)]
    pub pipeline: String,
    /// Resource name to fixture file, relative to the app directory.
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
}

impl AppConfig {
    /// Apply a name override, validate, and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the name is empty or a resource has no
    /// fixture path.
    pub fn finalize(mut self, name_override: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(name) = name_override.filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        self.validate()?;
        if self.pipeline.is_empty() {
            self.pipeline = format!("turbine-pipeline-{}", self.name);
        }
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingName);
        }
        if let Some((resource, _)) = self.resources.iter().find(|(_, p)| p.trim().is_empty()) {
            return Err(ConfigError::EmptyFixturePath {
                resource: resource.clone(),
            });
        }
        Ok(())
    }

    /// Absolute fixture path for `resource`, resolved against `app_dir`.
    pub fn fixture_path(&self, app_dir: &Path, resource: &str) -> Option<PathBuf> {
        self.resources.get(resource).map(|p| app_dir.join(p))
    }
}
