//! Handle to a named datastore.
//!
//! A [`Resource`] is stateless: every `records` and `write` call is an
//! independent operation on the connector, no transaction spans calls.
//! Both calls honour the turbine's cancellation token and I/O timeout; an
//! interrupted call yields [`TurbineError::Cancelled`] and nothing it read or
//! wrote counts as delivered.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use turbine_types::{
    ConnectorError, ErrorCategory, IoOperation, RecordsArray, ResourceConfig, TurbineError,
    WriteReport,
};

use crate::connector::Connector;

/// Write reports shared between a turbine and the resources it hands out.
pub(crate) type WriteLog = Arc<Mutex<Vec<WriteReport>>>;

#[derive(Clone)]
pub struct Resource {
    name: String,
    connector: Arc<dyn Connector>,
    cancel: CancellationToken,
    io_timeout: Option<Duration>,
    writes: WriteLog,
}

impl Resource {
    /// A standalone handle with its own cancellation token and no timeout.
    pub fn new(name: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        Self {
            name: name.into(),
            connector,
            cancel: CancellationToken::new(),
            io_timeout: None,
            writes: WriteLog::default(),
        }
    }

    pub(crate) fn attached(
        name: impl Into<String>,
        connector: Arc<dyn Connector>,
        cancel: CancellationToken,
        io_timeout: Option<Duration>,
        writes: WriteLog,
    ) -> Self {
        Self {
            name: name.into(),
            connector,
            cancel,
            io_timeout,
            writes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag of the backing connector.
    pub fn kind(&self) -> &str {
        self.connector.kind()
    }

    /// Read every record of `collection`.
    ///
    /// The returned array is labelled `"{resource}/{collection}"`.
    ///
    /// # Errors
    ///
    /// [`TurbineError::CollectionNotFound`] for an empty or unknown
    /// collection, [`TurbineError::Connector`] for any other connector
    /// failure, [`TurbineError::Cancelled`] if the call was interrupted.
    pub async fn records(
        &self,
        collection: &str,
        config: &ResourceConfig,
    ) -> Result<RecordsArray, TurbineError> {
        self.require_collection(collection)?;
        let started = Instant::now();

        let records = self
            .guard(IoOperation::Read, self.connector.read(collection, config))
            .await?
            .map_err(|e| self.connector_error(collection, e))?;

        tracing::info!(
            resource = %self.name,
            collection,
            records = records.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Read records"
        );
        Ok(RecordsArray::with_stream(
            format!("{}/{collection}", self.name),
            records,
        ))
    }

    /// Write `records` to `collection`, taking ownership of the array.
    ///
    /// The report holds exactly one outcome per input record. A partially
    /// failed write is not an error; inspect [`WriteReport::is_complete`].
    ///
    /// # Errors
    ///
    /// [`TurbineError::CollectionNotFound`] for an empty or unknown
    /// collection, [`TurbineError::Connector`] if the call failed as a whole,
    /// [`TurbineError::Cancelled`] if it was interrupted.
    pub async fn write(
        &self,
        records: RecordsArray,
        collection: &str,
        config: &ResourceConfig,
    ) -> Result<WriteReport, TurbineError> {
        self.require_collection(collection)?;
        let records = records.into_records();
        let started = Instant::now();

        let outcomes = self
            .guard(
                IoOperation::Write,
                self.connector.write(collection, &records, config),
            )
            .await?
            .map_err(|e| self.connector_error(collection, e))?;
        let report = WriteReport::reconcile(self.name.as_str(), collection, &records, outcomes);

        let duration_ms = started.elapsed().as_millis() as u64;
        if report.is_complete() {
            tracing::info!(
                resource = %self.name,
                collection,
                records = report.len(),
                duration_ms,
                "Wrote records"
            );
        } else {
            tracing::warn!(
                resource = %self.name,
                collection,
                written = report.written_count(),
                failed = report.failed_count(),
                duration_ms,
                "Write partially failed"
            );
        }

        self.writes.lock().push(report.clone());
        Ok(report)
    }

    fn require_collection(&self, collection: &str) -> Result<(), TurbineError> {
        if collection.is_empty() {
            return Err(TurbineError::CollectionNotFound {
                resource: self.name.clone(),
                collection: String::new(),
            });
        }
        Ok(())
    }

    fn connector_error(&self, collection: &str, error: ConnectorError) -> TurbineError {
        if error.category == ErrorCategory::NotFound {
            TurbineError::CollectionNotFound {
                resource: self.name.clone(),
                collection: collection.to_string(),
            }
        } else {
            TurbineError::Connector {
                resource: self.name.clone(),
                source: error,
            }
        }
    }

    /// Race `call` against the cancellation token and the I/O timeout.
    async fn guard<T>(
        &self,
        operation: IoOperation,
        call: impl Future<Output = T>,
    ) -> Result<T, TurbineError> {
        let cancelled = || {
            tracing::warn!(resource = %self.name, %operation, "Resource call cancelled");
            TurbineError::Cancelled {
                resource: self.name.clone(),
                operation,
            }
        };
        let bounded = async {
            match self.io_timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.ok(),
                None => Some(call.await),
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(cancelled()),
            out = bounded => out.ok_or_else(cancelled),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("kind", &self.connector.kind())
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}
