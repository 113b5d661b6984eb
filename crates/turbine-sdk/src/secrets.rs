//! Secret declaration and binding.
//!
//! Apps declare secret names up front in a [`SecretsRegistry`]. At bind time
//! every declared name is resolved through a [`SecretsProvider`] into an
//! immutable [`BoundSecrets`] map that process functions read through their
//! [`ProcessContext`](crate::context::ProcessContext).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use turbine_types::TurbineError;

/// Source of secret values.
pub trait SecretsProvider: Send + Sync {
    /// Value for `name`, or `None` if the provider cannot resolve it.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl SecretsProvider for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl SecretsProvider for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<P: SecretsProvider + ?Sized> SecretsProvider for Arc<P> {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

/// Declared secret names. Registration is additive and idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsRegistry {
    names: BTreeSet<String>,
}

impl SecretsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`. Returns `false` if it was already declared.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn register_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve every declared name.
    ///
    /// # Errors
    ///
    /// [`TurbineError::SecretUnresolved`] listing every name the provider
    /// could not resolve, in sorted order.
    pub fn bind(&self, provider: &dyn SecretsProvider) -> Result<BoundSecrets, TurbineError> {
        self.bind_over(provider, &BoundSecrets::default())
    }

    /// Like [`SecretsRegistry::bind`], but names already in `previous` keep
    /// their value and are not looked up again.
    ///
    /// # Errors
    ///
    /// [`TurbineError::SecretUnresolved`] listing every newly declared name
    /// the provider could not resolve.
    pub fn bind_over(
        &self,
        provider: &dyn SecretsProvider,
        previous: &BoundSecrets,
    ) -> Result<BoundSecrets, TurbineError> {
        let mut bound = BTreeMap::new();
        let mut missing = Vec::new();
        for name in &self.names {
            if let Some(value) = previous.0.get(name) {
                bound.insert(name.clone(), value.clone());
                continue;
            }
            match provider.lookup(name) {
                Some(value) => {
                    bound.insert(name.clone(), SecretValue(value));
                }
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(TurbineError::SecretUnresolved { names: missing });
        }
        Ok(BoundSecrets(Arc::new(bound)))
    }
}

/// A resolved secret. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Immutable name to value map shared by every function of one turbine.
#[derive(Clone, Default)]
pub struct BoundSecrets(Arc<BTreeMap<String, SecretValue>>);

impl BoundSecrets {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(SecretValue::expose)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for BoundSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = SecretsRegistry::new();
        assert!(registry.register("API_KEY"));
        assert!(!registry.register("API_KEY"));
        registry.register_all(["PGPASS", "API_KEY"]);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["API_KEY", "PGPASS"]);
    }

    #[test]
    fn bind_resolves_declared_names_only() {
        let mut registry = SecretsRegistry::new();
        registry.register("API_KEY");
        let bound = registry
            .bind(&provider(&[("API_KEY", "s3cr3t"), ("OTHER", "x")]))
            .unwrap();
        assert_eq!(bound.get("API_KEY"), Some("s3cr3t"));
        assert!(!bound.contains("OTHER"));
        assert_eq!(bound.len(), 1);
    }

    #[test]
    fn bind_reports_every_missing_name_sorted() {
        let mut registry = SecretsRegistry::new();
        registry.register_all(["ZED", "API_KEY", "PRESENT"]);
        let err = registry.bind(&provider(&[("PRESENT", "1")])).unwrap_err();
        match err {
            TurbineError::SecretUnresolved { names } => assert_eq!(names, ["API_KEY", "ZED"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bind_over_only_looks_up_new_names() {
        let mut registry = SecretsRegistry::new();
        registry.register("API_KEY");
        let first = registry.bind(&provider(&[("API_KEY", "s3cr3t")])).unwrap();

        registry.register("PGPASS");
        let second = registry
            .bind_over(&provider(&[("PGPASS", "pw")]), &first)
            .unwrap();
        assert_eq!(second.get("API_KEY"), Some("s3cr3t"));
        assert_eq!(second.get("PGPASS"), Some("pw"));

        let err = registry.bind_over(&provider(&[]), &first).unwrap_err();
        assert!(matches!(err, TurbineError::SecretUnresolved { names } if names == ["PGPASS"]));
    }

    #[test]
    fn empty_registry_binds_empty() {
        let bound = SecretsRegistry::new().bind(&provider(&[])).unwrap();
        assert!(bound.is_empty());
    }

    #[test]
    fn formatting_redacts_values() {
        let mut registry = SecretsRegistry::new();
        registry.register("API_KEY");
        let bound = registry.bind(&provider(&[("API_KEY", "s3cr3t")])).unwrap();
        let debug = format!("{bound:?}");
        assert!(debug.contains("API_KEY"));
        assert!(!debug.contains("s3cr3t"));

        let value = SecretValue("s3cr3t".into());
        assert_eq!(value.to_string(), "***");
        assert!(!format!("{value:?}").contains("s3cr3t"));
    }
}
