//! App activation.
//!
//! An [`Executor`] is built once from an app config and the registered app.
//! [`Executor::activate`] consumes it, so the app's `run` executes exactly
//! once. Partial write failures are reported in the [`RunReport`], never
//! turned into errors here; what to do about them is the caller's decision.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use turbine_sdk::{App, SecretsProvider, Turbine};

use crate::config::AppConfig;
use crate::resolve::ConnectorRegistry;
use crate::result::RunReport;
use crate::secrets::EnvSecretsProvider;

pub struct Executor {
    config: AppConfig,
    app: Box<dyn App>,
    resolver: ConnectorRegistry,
    provider: Arc<dyn SecretsProvider>,
    deadline: Option<Duration>,
    io_timeout: Option<Duration>,
}

impl Executor {
    /// Executor with no resources and environment-backed secrets.
    pub fn new(config: AppConfig, app: impl App + 'static) -> Self {
        Self {
            config,
            app: Box::new(app),
            resolver: ConnectorRegistry::new(),
            provider: Arc::new(EnvSecretsProvider),
            deadline: None,
            io_timeout: None,
        }
    }

    #[must_use]
    pub fn resolver(mut self, resolver: ConnectorRegistry) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn secrets_provider(mut self, provider: impl SecretsProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Cancel every in-flight resource call once `limit` has elapsed.
    #[must_use]
    pub fn deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    #[must_use]
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Bind the app's declared secrets and run it.
    ///
    /// Secrets the app declares through [`App::secrets`] are resolved before
    /// `run` starts; if any is missing the app never reads a record.
    pub async fn activate(self) -> RunReport {
        let Self {
            config,
            app,
            resolver,
            provider,
            deadline,
            io_timeout,
        } = self;
        let started = Instant::now();
        let cancel = CancellationToken::new();

        tracing::info!(
            app = %config.name,
            pipeline = %config.pipeline,
            resources = resolver.len(),
            "Activating app"
        );

        let mut builder = Turbine::builder()
            .resolver(resolver)
            .secrets_provider(provider)
            .cancellation(cancel.clone());
        if let Some(timeout) = io_timeout {
            builder = builder.io_timeout(timeout);
        }
        let mut turbine = builder.build();
        turbine.register_secrets(app.secrets().iter().copied());

        let timer = deadline.map(|limit| {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!(deadline_secs = limit.as_secs_f64(), "Run deadline reached");
                token.cancel();
            })
        });

        // The binding stays cached in the turbine for every process stage.
        let error = match turbine.bind_secrets() {
            Ok(_) => app.run(&mut turbine).await.err(),
            Err(err) => Some(err),
        };
        if let Some(timer) = timer {
            timer.abort();
        }

        let report = RunReport {
            app: config.name,
            pipeline: config.pipeline,
            error,
            stages: turbine.stages().to_vec(),
            writes: turbine.write_reports(),
            duration_secs: started.elapsed().as_secs_f64(),
        };

        match &report.error {
            None => tracing::info!(
                app = %report.app,
                stages = report.stages.len(),
                records_written = report.records_written(),
                failed_records = report.failed_records(),
                duration_secs = report.duration_secs,
                "App run completed"
            ),
            Some(err) => tracing::error!(
                app = %report.app,
                error = %err,
                retryable = err.is_retryable(),
                "App run failed"
            ),
        }
        report
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("deadline", &self.deadline)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}
