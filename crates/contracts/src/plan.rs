//! Deployment plan: the serde-facing configuration surface.
//!
//! A `DispatchPlan` describes which dispatchers exist, how their flush
//! policy is tuned, and which sink each one forwards to. The plan is the
//! parse target of `config_loader`; the dispatcher crate consumes the
//! validated runtime form (`DispatcherConfig`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{ChannelId, ContractError, Severity};

/// Top-level configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// Channel used when a call site does not name one
    #[serde(default = "default_channel")]
    pub default_channel: String,

    /// Minimum severity the console backend renders
    #[serde(default)]
    pub console_severity: Severity,

    /// Dispatcher declarations
    #[serde(default)]
    pub dispatchers: Vec<DispatcherSpec>,

    /// Sink declarations
    #[serde(default)]
    pub sinks: Vec<SinkSpec>,
}

fn default_channel() -> String {
    "app".to_string()
}

/// One dispatcher declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherSpec {
    /// Routing label attached to every forwarded record
    pub channel: String,

    /// Severity forwarded verbatim
    #[serde(default)]
    pub level: Severity,

    /// Diagnostic name embedded in forwarded output
    pub name: String,

    /// Staleness bound, milliseconds (evaluated lazily on push)
    #[serde(default = "default_max_batch_age_ms")]
    pub max_batch_age_ms: u64,

    /// Hard cap on the active batch, checked before each append
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Name of the sink this dispatcher forwards to
    pub sink: String,
}

fn default_max_batch_age_ms() -> u64 {
    1000
}

fn default_max_batch_size() -> usize {
    256
}

impl DispatcherSpec {
    /// Convert to the validated runtime configuration.
    pub fn to_config(&self) -> Result<DispatcherConfig, ContractError> {
        DispatcherConfig::new(
            ChannelId::from(self.channel.as_str()),
            self.level,
            self.name.as_str(),
            Duration::from_millis(self.max_batch_age_ms),
            self.max_batch_size,
        )
    }
}

/// One sink declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSpec {
    /// Sink name, referenced by `DispatcherSpec.sink`
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Forward through the tracing backend
    Log,
    /// Append JSON lines to a file
    File,
}

/// Immutable runtime configuration of one dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Routing label
    pub channel: ChannelId,
    /// Severity forwarded verbatim
    pub level: Severity,
    /// Diagnostic name
    pub name: Arc<str>,
    /// Staleness bound
    pub max_batch_age: Duration,
    /// Active batch cap, `>= 1`
    pub max_batch_size: usize,
}

impl DispatcherConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// - empty `channel`
    /// - `max_batch_size == 0` (would rotate on every push and never append)
    pub fn new(
        channel: ChannelId,
        level: Severity,
        name: &str,
        max_batch_age: Duration,
        max_batch_size: usize,
    ) -> Result<Self, ContractError> {
        if channel.is_empty() {
            return Err(ContractError::config_validation(
                "channel",
                "channel must not be empty",
            ));
        }
        if max_batch_size == 0 {
            return Err(ContractError::config_validation(
                "max_batch_size",
                "max_batch_size must be >= 1",
            ));
        }
        Ok(Self {
            channel,
            level,
            name: Arc::from(name),
            max_batch_age,
            max_batch_size,
        })
    }
}
