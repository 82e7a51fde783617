//! Forwarded record envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::{ChannelId, Severity};

/// One forwarded entry, handed to a sink by the drain task.
///
/// `timestamp` is the record's arrival time, captured at push with
/// microsecond resolution and never mutated afterward. `channel` and
/// `source` are cheap `Arc`-backed labels shared with the dispatcher
/// configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SinkRecord<T> {
    /// Arrival time of the record at the dispatcher
    pub timestamp: DateTime<Utc>,
    /// Routing label
    pub channel: ChannelId,
    /// Severity forwarded verbatim
    pub level: Severity,
    /// Diagnostic name of the originating dispatcher
    pub source: Arc<str>,
    /// Caller-supplied payload, never inspected by the dispatcher
    pub record: T,
}
