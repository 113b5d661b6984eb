//! Datastore connector traits.
//!
//! A [`Connector`] is the only thing the runtime knows about a datastore:
//! read a collection into records, write records to a collection and report
//! a per-record outcome. Which connector backs a resource name is decided by
//! a [`ResourceResolver`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use turbine_types::{ConnectorError, Record, RecordOutcome, ResourceConfig};

/// Connector to one datastore.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Short type tag used in logs, e.g. `"fixture"` or `"memory"`.
    fn kind(&self) -> &str;

    /// Read every record of `collection`.
    ///
    /// A missing collection should be reported with
    /// [`ConnectorError::not_found`].
    async fn read(
        &self,
        collection: &str,
        config: &ResourceConfig,
    ) -> Result<Vec<Record>, ConnectorError>;

    /// Write `records` to `collection`.
    ///
    /// Returns one [`RecordOutcome`] per record, indexed by position in
    /// `records`. An `Err` means the call as a whole failed and nothing was
    /// written.
    async fn write(
        &self,
        collection: &str,
        records: &[Record],
        config: &ResourceConfig,
    ) -> Result<Vec<RecordOutcome>, ConnectorError>;
}

/// Maps resource names to connectors.
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Connector>>;
}

impl ResourceResolver for BTreeMap<String, Arc<dyn Connector>> {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.get(name).cloned()
    }
}

impl ResourceResolver for HashMap<String, Arc<dyn Connector>> {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.get(name).cloned()
    }
}

impl<R: ResourceResolver + ?Sized> ResourceResolver for Arc<R> {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Connector>> {
        (**self).resolve(name)
    }
}
