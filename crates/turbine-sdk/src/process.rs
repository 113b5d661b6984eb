//! Process functions and the invocation contract.
//!
//! Every invocation goes through the same four steps: bind secrets, invoke
//! the function, collect its output or error, and record a [`StageReport`].
//! Bind happens in [`Turbine`](crate::turbine::Turbine); this module owns
//! the last three.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::Serialize;
use turbine_types::{BatchRef, RecordError, RecordsArray, TurbineError};

use crate::context::ProcessContext;

/// A named transformation over a record batch.
///
/// The function owns the input array for the duration of the call and
/// returns the array that becomes the stage output. Any error whose chain
/// contains a [`RecordError`] is reported with the offending record's key.
pub trait Function: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, records: RecordsArray, ctx: &ProcessContext)
        -> anyhow::Result<RecordsArray>;
}

/// A [`Function`] backed by a closure. Build one with [`function`].
pub struct FnFunction<F> {
    name: String,
    f: F,
}

/// Name a closure as a process function.
///
/// ```ignore
/// let upper = function("upper", |mut records, _ctx| {
///     records.try_for_each(|r| r.set("seen", true))?;
///     Ok(records)
/// });
/// ```
pub fn function<F>(name: impl Into<String>, f: F) -> FnFunction<F>
where
    F: Fn(RecordsArray, &ProcessContext) -> anyhow::Result<RecordsArray> + Send + Sync,
{
    FnFunction {
        name: name.into(),
        f,
    }
}

impl<F> Function for FnFunction<F>
where
    F: Fn(RecordsArray, &ProcessContext) -> anyhow::Result<RecordsArray> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        &self,
        records: RecordsArray,
        ctx: &ProcessContext,
    ) -> anyhow::Result<RecordsArray> {
        (self.f)(records, ctx)
    }
}

// ---------------------------------------------------------------------------
// Stage reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Succeeded,
    Failed,
}

/// Terminal record of one process invocation.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub function: String,
    pub status: StageStatus,
    pub batch: BatchRef,
    pub records_in: usize,
    pub records_out: usize,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageReport {
    pub(crate) fn failed(function: &str, batch: BatchRef, error: &TurbineError) -> Self {
        Self {
            function: function.to_string(),
            status: StageStatus::Failed,
            records_in: batch.records,
            batch,
            records_out: 0,
            duration_secs: 0.0,
            error: Some(error.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == StageStatus::Succeeded
    }
}

// ---------------------------------------------------------------------------
// Invoke / collect
// ---------------------------------------------------------------------------

/// Run `function` over `records` and classify the outcome.
///
/// Panics inside the function are caught and reported as
/// [`TurbineError::ProcessFunction`].
pub(crate) fn invoke(
    function: &dyn Function,
    records: RecordsArray,
    ctx: &ProcessContext,
) -> (Result<RecordsArray, TurbineError>, StageReport) {
    let name = function.name();
    let batch = records.batch_ref();
    let started = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| function.process(records, ctx)));
    let result = match outcome {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(classify(name, &batch, &err)),
        Err(payload) => Err(TurbineError::ProcessFunction {
            function: name.to_string(),
            batch: batch.clone(),
            message: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    };

    let duration_secs = started.elapsed().as_secs_f64();
    let report = match &result {
        Ok(output) => StageReport {
            function: name.to_string(),
            status: StageStatus::Succeeded,
            records_in: batch.records,
            batch,
            records_out: output.len(),
            duration_secs,
            error: None,
        },
        Err(err) => StageReport {
            duration_secs,
            ..StageReport::failed(name, batch, err)
        },
    };
    (result, report)
}

fn classify(function: &str, batch: &BatchRef, err: &anyhow::Error) -> TurbineError {
    match err.chain().find_map(|e| e.downcast_ref::<RecordError>()) {
        Some(source) => TurbineError::Record {
            function: function.to_string(),
            batch: batch.clone(),
            source: source.clone(),
        },
        None => TurbineError::ProcessFunction {
            function: function.to_string(),
            batch: batch.clone(),
            message: format!("{err:#}"),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
