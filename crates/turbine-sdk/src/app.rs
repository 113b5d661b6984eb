//! The data-app entry point.

use async_trait::async_trait;
use turbine_types::TurbineError;

use crate::turbine::Turbine;

/// A data app: a single `run` that wires resources and functions together.
///
/// The executor calls `run` exactly once per activation.
///
/// ```ignore
/// struct Archive;
///
/// #[async_trait]
/// impl App for Archive {
///     async fn run(&self, turbine: &mut Turbine) -> Result<(), TurbineError> {
///         let source = turbine.resources("pg")?;
///         let records = source.records("users", &ResourceConfig::new()).await?;
///         turbine.resources("s3")?.write(records, "users_archive", &ResourceConfig::new()).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait App: Send + Sync {
    /// Secrets the app needs, resolved by the executor before `run`.
    ///
    /// Secrets may also be registered from inside `run`; those are resolved
    /// on the next process call.
    fn secrets(&self) -> &[&str] {
        &[]
    }

    async fn run(&self, turbine: &mut Turbine) -> Result<(), TurbineError>;
}
