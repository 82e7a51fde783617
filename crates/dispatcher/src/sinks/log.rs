//! LogSink - forwards records through tracing

use std::fmt::Debug;

use contracts::{ContractError, RecordSink, Severity, SinkRecord};
use tracing::{debug, error, info, instrument, trace, warn};

/// Sink that renders forwarded records through the tracing backend.
///
/// The console analog: each entry becomes one event at its own severity,
/// carrying channel, source, and arrival timestamp as fields. Entries
/// below `min_severity` are skipped, mirroring the console level gate.
pub struct LogSink {
    name: String,
    min_severity: Severity,
}

impl LogSink {
    /// Create a new LogSink forwarding every severity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_severity: Severity::Trace,
        }
    }

    /// Create a LogSink that skips entries below `min_severity`.
    pub fn with_min_severity(name: impl Into<String>, min_severity: Severity) -> Self {
        Self {
            name: name.into(),
            min_severity,
        }
    }

    fn emit<T: Debug>(&self, entry: &SinkRecord<T>) {
        match entry.level {
            Severity::Trace => trace!(
                channel = %entry.channel,
                source = %entry.source,
                timestamp = %entry.timestamp,
                record = ?entry.record,
            ),
            Severity::Debug => debug!(
                channel = %entry.channel,
                source = %entry.source,
                timestamp = %entry.timestamp,
                record = ?entry.record,
            ),
            Severity::Info => info!(
                channel = %entry.channel,
                source = %entry.source,
                timestamp = %entry.timestamp,
                record = ?entry.record,
            ),
            Severity::Warning => warn!(
                channel = %entry.channel,
                source = %entry.source,
                timestamp = %entry.timestamp,
                record = ?entry.record,
            ),
            Severity::Error | Severity::Fatal => error!(
                channel = %entry.channel,
                source = %entry.source,
                timestamp = %entry.timestamp,
                severity = %entry.level,
                record = ?entry.record,
            ),
        }
    }
}

impl<T: Debug + Sync> RecordSink<T> for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, entry: &SinkRecord<T>) -> Result<(), ContractError> {
        if entry.level >= self.min_severity {
            self.emit(entry);
        }
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
