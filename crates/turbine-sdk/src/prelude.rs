//! Convenience re-exports for data-app authors.
//!
//! ```ignore
//! use turbine_sdk::prelude::*;
//! ```

// App and runtime handle
pub use crate::app::App;
pub use crate::turbine::Turbine;

// Resources and connectors
pub use crate::connector::{Connector, ResourceResolver};
pub use crate::resource::Resource;

// Process functions
pub use crate::context::ProcessContext;
pub use crate::process::{function, Function};

// Record model
pub use turbine_types::{
    CdcEnvelope, FunctionConfig, Operation, Payload, Record, RecordFormat, RecordsArray,
    ResourceConfig, WriteReport,
};

// Errors
pub use turbine_types::{ConnectorError, RecordError, TurbineError};

pub use async_trait::async_trait;
