//! Shared Turbine record model, connector configuration, and error types.
//!
//! This crate has no async or I/O dependencies so both the SDK that data apps
//! program against and connector implementations can depend on it.

pub mod cdc;
pub mod config;
pub mod error;
mod path;
pub mod record;
pub mod records;
pub mod schema;
pub mod write;

pub use cdc::{CdcEnvelope, CdcMetadata, Operation};
pub use config::{ConfigMap, ConfigValue, FunctionConfig, ResourceConfig};
pub use error::{
    BatchRef, ConnectorError, ErrorCategory, ErrorScope, IoOperation, RecordError, TurbineError,
};
pub use path::kind_name;
pub use record::{Payload, Record, RecordFormat};
pub use records::RecordsArray;
pub use write::{RecordOutcome, WriteReport, WriteStatus};
