//! Local execution of Turbine data apps.
//!
//! Loads `app.json`, resolves resource names to connectors, binds secrets,
//! and activates a registered [`App`](turbine_sdk::App) exactly once.

pub mod config;
pub mod executor;
pub mod fixtures;
pub mod memory;
pub mod resolve;
pub mod result;
pub mod secrets;

// Re-export public API for convenience
pub use config::{AppConfig, ConfigError};
pub use executor::Executor;
pub use fixtures::FixtureConnector;
pub use memory::MemoryConnector;
pub use resolve::ConnectorRegistry;
pub use result::RunReport;
pub use secrets::{EnvSecretsProvider, LayeredSecretsProvider, StaticSecretsProvider};
