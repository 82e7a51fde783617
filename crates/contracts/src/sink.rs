//! RecordSink trait - drain task output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, SinkRecord};

/// Record output trait
///
/// All sink implementations must implement this trait. The drain task calls
/// `write` once per forwarded entry; a sink must not block indefinitely.
/// Retries and durability are the sink's concern, never the dispatcher's.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink<T> {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one forwarded entry
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, entry: &SinkRecord<T>) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
