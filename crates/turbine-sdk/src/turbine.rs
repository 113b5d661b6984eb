//! The runtime handle a data app programs against.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use turbine_types::{FunctionConfig, RecordsArray, TurbineError, WriteReport};

use crate::connector::{Connector, ResourceResolver};
use crate::context::ProcessContext;
use crate::process::{self, Function, StageReport};
use crate::resource::{Resource, WriteLog};
use crate::secrets::{BoundSecrets, SecretsProvider, SecretsRegistry};

/// Resource lookup, process invocation and secret declaration for one app run.
///
/// Build with [`Turbine::builder`]:
///
/// ```ignore
/// let mut turbine = Turbine::builder()
///     .resolver(connectors)
///     .secrets_provider(EnvSecretsProvider)
///     .io_timeout(Duration::from_secs(30))
///     .build();
/// ```
pub struct Turbine {
    resolver: Arc<dyn ResourceResolver>,
    provider: Arc<dyn SecretsProvider>,
    registry: SecretsRegistry,
    bound: BoundSecrets,
    cancel: CancellationToken,
    io_timeout: Option<Duration>,
    stages: Vec<StageReport>,
    writes: WriteLog,
}

#[derive(Default)]
pub struct TurbineBuilder {
    resolver: Option<Arc<dyn ResourceResolver>>,
    provider: Option<Arc<dyn SecretsProvider>>,
    cancel: Option<CancellationToken>,
    io_timeout: Option<Duration>,
}

impl TurbineBuilder {
    #[must_use]
    pub fn resolver(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn secrets_provider(mut self, provider: impl SecretsProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Token that interrupts every in-flight resource call when cancelled.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Upper bound on each individual `records` or `write` call.
    #[must_use]
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Turbine {
        Turbine {
            resolver: self
                .resolver
                .unwrap_or_else(|| Arc::new(BTreeMap::<String, Arc<dyn Connector>>::new())),
            provider: self
                .provider
                .unwrap_or_else(|| Arc::new(BTreeMap::<String, String>::new())),
            registry: SecretsRegistry::new(),
            bound: BoundSecrets::default(),
            cancel: self.cancel.unwrap_or_else(CancellationToken::new),
            io_timeout: self.io_timeout,
            stages: Vec::new(),
            writes: WriteLog::default(),
        }
    }
}

impl Turbine {
    pub fn builder() -> TurbineBuilder {
        TurbineBuilder::default()
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Handle to the resource registered under `name`.
    ///
    /// # Errors
    ///
    /// [`TurbineError::ResourceNotFound`] if the resolver does not know `name`.
    pub fn resources(&self, name: &str) -> Result<Resource, TurbineError> {
        let connector = self
            .resolver
            .resolve(name)
            .ok_or_else(|| TurbineError::ResourceNotFound {
                resource: name.to_string(),
            })?;
        tracing::debug!(resource = name, kind = connector.kind(), "Resolved resource");
        Ok(Resource::attached(
            name,
            connector,
            self.cancel.clone(),
            self.io_timeout,
            Arc::clone(&self.writes),
        ))
    }

    // ------------------------------------------------------------------
    // Secrets
    // ------------------------------------------------------------------

    /// Declare a secret the app's functions need.
    pub fn register_secret(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.registry.register(name.clone()) {
            tracing::debug!(secret = %name, "Registered secret");
        }
    }

    pub fn register_secrets<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.register_secret(name);
        }
    }

    pub fn secrets(&self) -> &SecretsRegistry {
        &self.registry
    }

    /// Resolve every declared secret that is not bound yet.
    ///
    /// Values are resolved once and reused by every later process call;
    /// only names registered since the last bind reach the provider.
    ///
    /// # Errors
    ///
    /// [`TurbineError::SecretUnresolved`] naming every unresolved secret.
    pub fn bind_secrets(&mut self) -> Result<BoundSecrets, TurbineError> {
        if self.bound.len() < self.registry.len() {
            self.bound = self
                .registry
                .bind_over(self.provider.as_ref(), &self.bound)?;
        }
        Ok(self.bound.clone())
    }

    // ------------------------------------------------------------------
    // Process
    // ------------------------------------------------------------------

    /// Run `function` over `records` with an empty static configuration.
    ///
    /// # Errors
    ///
    /// See [`Turbine::process_with_config`].
    pub fn process(
        &mut self,
        records: RecordsArray,
        function: &dyn Function,
    ) -> Result<RecordsArray, TurbineError> {
        self.process_with_config(records, function, FunctionConfig::new())
    }

    /// Bind secrets, run `function` over `records`, and record a stage report.
    ///
    /// # Errors
    ///
    /// [`TurbineError::SecretUnresolved`] before the function runs,
    /// [`TurbineError::Record`] if it failed on a field access,
    /// [`TurbineError::ProcessFunction`] for any other failure or a panic.
    pub fn process_with_config(
        &mut self,
        records: RecordsArray,
        function: &dyn Function,
        config: FunctionConfig,
    ) -> Result<RecordsArray, TurbineError> {
        let name = function.name();
        let secrets = match self.bind_secrets() {
            Ok(secrets) => secrets,
            Err(err) => {
                tracing::error!(function = name, error = %err, "Secret binding failed");
                self.stages
                    .push(StageReport::failed(name, records.batch_ref(), &err));
                return Err(err);
            }
        };

        let ctx = ProcessContext::new(name, secrets, config);
        let (result, report) = process::invoke(function, records, &ctx);
        match &result {
            Ok(_) => tracing::info!(
                function = name,
                records_in = report.records_in,
                records_out = report.records_out,
                duration_secs = report.duration_secs,
                "Process function completed"
            ),
            Err(err) => tracing::error!(function = name, error = %err, "Process function failed"),
        }
        self.stages.push(report);
        result
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// Stage reports in invocation order.
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Reports of every write made through resources from this turbine.
    pub fn write_reports(&self) -> Vec<WriteReport> {
        self.writes.lock().clone()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl std::fmt::Debug for Turbine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Turbine")
            .field("secrets", &self.registry)
            .field("bound", &self.bound)
            .field("io_timeout", &self.io_timeout)
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}
