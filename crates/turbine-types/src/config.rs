//! Flat string-keyed configuration passed verbatim to connectors and functions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Ordered key/value configuration.
///
/// ```
/// use turbine_types::ResourceConfig;
///
/// let cfg = ResourceConfig::new().with("incrementing.field.name", "id");
/// assert_eq!(cfg.get_str("incrementing.field.name"), Some("id"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(BTreeMap<String, ConfigValue>);

/// Connector configuration for a `records` or `write` call.
pub type ResourceConfig = ConfigMap;

/// Static configuration handed to a process function.
pub type FunctionConfig = ConfigMap;

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render every value as a string, for connectors taking string maps.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.0.iter().map(|(k, v)| (k.clone(), v.to_string())).collect()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_lookup() {
        let cfg = ConfigMap::new()
            .with("behavior.on.null.values", "ignore")
            .with("buffer.flush.time", 10)
            .with("upsert", true);
        assert_eq!(cfg.len(), 3);
        assert_eq!(cfg.get_str("behavior.on.null.values"), Some("ignore"));
        assert_eq!(cfg.get("buffer.flush.time"), Some(&ConfigValue::Int(10)));
        assert_eq!(cfg.get_str("upsert"), None);
    }

    #[test]
    fn to_string_map_renders_primitives() {
        let cfg: ConfigMap = [("a", ConfigValue::Float(1.5)), ("b", ConfigValue::Bool(false))]
            .into_iter()
            .collect();
        let map = cfg.to_string_map();
        assert_eq!(map["a"], "1.5");
        assert_eq!(map["b"], "false");
    }

    #[test]
    fn deserializes_flat_json_objects() {
        let cfg: ConfigMap =
            serde_json::from_str(r#"{"table": "users", "batch": 500, "ratio": 0.5, "on": true}"#)
                .unwrap();
        assert_eq!(cfg.get("batch"), Some(&ConfigValue::Int(500)));
        assert_eq!(cfg.get("ratio"), Some(&ConfigValue::Float(0.5)));
        assert_eq!(cfg.get("on"), Some(&ConfigValue::Bool(true)));
        assert_eq!(cfg.get_str("table"), Some("users"));
    }

    #[test]
    fn nested_values_are_rejected() {
        let result = serde_json::from_str::<ConfigMap>(r#"{"nested": {"a": 1}}"#);
        assert!(result.is_err());
    }
}
