//! Secret providers for local runs.

use std::collections::BTreeMap;

use turbine_sdk::SecretsProvider;

use crate::ConfigError;

/// Resolves secrets from process environment variables.
///
/// A variable that is set but empty counts as unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretsProvider;

impl SecretsProvider for EnvSecretsProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed name to value map, e.g. from `--secret NAME=VALUE` flags.
#[derive(Clone, Default)]
pub struct StaticSecretsProvider {
    values: BTreeMap<String, String>,
}

impl StaticSecretsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Parse `NAME=VALUE` pairs.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSecretPair`] naming the first entry with no `=`
    /// or an empty name.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut provider = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((name, value)) if !name.is_empty() => provider.insert(name, value),
                _ => {
                    return Err(ConfigError::InvalidSecretPair {
                        entry: pair.to_string(),
                    })
                }
            }
        }
        Ok(provider)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SecretsProvider for StaticSecretsProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl std::fmt::Debug for StaticSecretsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Asks each provider in turn; the first hit wins.
#[derive(Default)]
pub struct LayeredSecretsProvider {
    layers: Vec<Box<dyn SecretsProvider>>,
}

impl LayeredSecretsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn layer(mut self, provider: impl SecretsProvider + 'static) -> Self {
        self.layers.push(Box::new(provider));
        self
    }
}

impl SecretsProvider for LayeredSecretsProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.lookup(name))
    }
}
