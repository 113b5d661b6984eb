//! Resource name to connector resolution.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use turbine_sdk::{Connector, ResourceResolver};

use crate::config::AppConfig;
use crate::fixtures::FixtureConnector;

/// Named connectors available to an app run.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One [`FixtureConnector`] per resource listed in `app.json`, with
    /// fixture paths resolved against `app_dir`.
    pub fn from_config(config: &AppConfig, app_dir: &Path) -> Self {
        let mut registry = Self::new();
        for (name, fixture) in &config.resources {
            let path = app_dir.join(fixture);
            tracing::debug!(resource = %name, path = %path.display(), "Registered fixture resource");
            registry.register(name.clone(), Arc::new(FixtureConnector::new(name.clone(), path)));
        }
        registry
    }

    /// Register or replace the connector behind `name`.
    pub fn register(&mut self, name: impl Into<String>, connector: Arc<dyn Connector>) {
        self.connectors.insert(name.into(), connector);
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        self.register(name, connector);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl ResourceResolver for ConnectorRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(name).cloned()
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.connectors.iter().map(|(k, c)| (k, c.kind())))
            .finish()
    }
}
