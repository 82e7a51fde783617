//! Sink implementations
//!
//! Contains LogSink, JsonFileSink, and the plan-driven factory.

use std::fmt::Debug;

use contracts::{ContractError, RecordSink, Severity, SinkRecord, SinkSpec, SinkType};
use serde::Serialize;
use tracing::instrument;

use crate::error::DispatcherError;

mod file;
mod log;

pub use self::file::JsonFileSink;
pub use self::log::LogSink;

/// A sink selected once at startup from a [`SinkSpec`].
///
/// The backend choice is made when the plan is loaded; call sites and the
/// dispatcher stay backend-agnostic.
pub enum PlanSink {
    /// Tracing/console backend
    Log(LogSink),
    /// JSON-lines file backend
    File(JsonFileSink),
}

/// Create a sink from its declaration.
///
/// `console_severity` gates the Log variant only; file sinks archive every
/// severity.
#[instrument(
    name = "build_sink",
    skip(spec),
    fields(sink = %spec.name, sink_type = ?spec.sink_type)
)]
pub fn build_sink(spec: &SinkSpec, console_severity: Severity) -> Result<PlanSink, DispatcherError> {
    match spec.sink_type {
        SinkType::Log => Ok(PlanSink::Log(LogSink::with_min_severity(
            &spec.name,
            console_severity,
        ))),
        SinkType::File => {
            let sink = JsonFileSink::from_params(&spec.name, &spec.params)
                .map_err(|e| DispatcherError::sink_creation(&spec.name, e.to_string()))?;
            Ok(PlanSink::File(sink))
        }
    }
}

impl<T: Debug + Serialize + Sync> RecordSink<T> for PlanSink {
    fn name(&self) -> &str {
        match self {
            Self::Log(sink) => RecordSink::<T>::name(sink),
            Self::File(sink) => RecordSink::<T>::name(sink),
        }
    }

    async fn write(&mut self, entry: &SinkRecord<T>) -> Result<(), ContractError> {
        match self {
            Self::Log(sink) => sink.write(entry).await,
            Self::File(sink) => sink.write(entry).await,
        }
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Log(sink) => RecordSink::<T>::flush(sink).await,
            Self::File(sink) => RecordSink::<T>::flush(sink).await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Log(sink) => RecordSink::<T>::close(sink).await,
            Self::File(sink) => RecordSink::<T>::close(sink).await,
        }
    }
}
