//! Runtime API for Turbine data apps.
//!
//! A data app implements [`App`] and receives a [`Turbine`] handle through
//! which it reads and writes [`Resource`]s, runs process [`Function`]s over
//! record batches, and declares the secrets those functions need.

pub mod app;
pub mod connector;
pub mod context;
pub mod prelude;
pub mod process;
pub mod resource;
pub mod secrets;
pub mod turbine;

pub use async_trait::async_trait;
pub use turbine_types as types;

pub use app::App;
pub use connector::{Connector, ResourceResolver};
pub use context::ProcessContext;
pub use process::{function, FnFunction, Function, StageReport, StageStatus};
pub use resource::Resource;
pub use secrets::{BoundSecrets, SecretValue, SecretsProvider, SecretsRegistry};
pub use turbine::{Turbine, TurbineBuilder};
