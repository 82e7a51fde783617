//! DispatcherRegistry - explicit per-process mapping from channel to dispatcher
//!
//! Replaces an implicit global logger map with an owned object that is
//! created at process start and passed to the code that needs it, so tests
//! stay hermetic.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, instrument};

use contracts::{DispatchPlan, DispatcherConfig, RecordSink};

use crate::dispatcher::BufferedDispatcher;
use crate::error::DispatcherError;
use crate::sinks::build_sink;

/// Registry of named dispatchers, keyed by channel.
pub struct DispatcherRegistry<T> {
    default_channel: String,
    inner: Mutex<HashMap<String, Arc<BufferedDispatcher<T>>>>,
}

impl<T: Send + 'static> DispatcherRegistry<T> {
    /// Create an empty registry.
    ///
    /// `default_channel` is the lookup target for an empty channel key.
    pub fn new(default_channel: impl Into<String>) -> Self {
        Self {
            default_channel: default_channel.into(),
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// The channel an empty lookup key resolves to.
    pub fn default_channel(&self) -> &str {
        &self.default_channel
    }

    /// Register a dispatcher under a channel, replacing any previous one.
    ///
    /// A replaced dispatcher keeps running until shut down by whoever
    /// still holds it.
    pub fn register(&self, channel: impl Into<String>, dispatcher: Arc<BufferedDispatcher<T>>) {
        let channel = channel.into();
        debug!(channel = %channel, "dispatcher registered");
        self.inner.lock().unwrap().insert(channel, dispatcher);
    }

    /// Look up a dispatcher; an empty key resolves to the default channel.
    pub fn get(&self, channel: &str) -> Option<Arc<BufferedDispatcher<T>>> {
        let key = if channel.is_empty() {
            self.default_channel.as_str()
        } else {
            channel
        };
        self.inner.lock().unwrap().get(key).cloned()
    }

    /// Look up a dispatcher, lazily creating it with `make` if absent.
    ///
    /// `make` receives the resolved channel key and returns the config and
    /// sink for the new dispatcher.
    pub fn get_or_create<S, F>(
        &self,
        channel: &str,
        make: F,
    ) -> Result<Arc<BufferedDispatcher<T>>, DispatcherError>
    where
        S: RecordSink<T> + Send + 'static,
        F: FnOnce(&str) -> Result<(DispatcherConfig, S), DispatcherError>,
    {
        let key = if channel.is_empty() {
            self.default_channel.as_str()
        } else {
            channel
        };

        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.get(key) {
            return Ok(Arc::clone(existing));
        }

        let (config, sink) = make(key)?;
        let dispatcher = Arc::new(BufferedDispatcher::spawn(config, sink));
        inner.insert(key.to_string(), Arc::clone(&dispatcher));
        debug!(channel = %key, "dispatcher created lazily");
        Ok(dispatcher)
    }

    /// Registered channel names.
    pub fn channels(&self) -> Vec<String> {
        self.inner.lock().unwrap().keys().cloned().collect()
    }

    /// Number of registered dispatchers.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// True when no dispatcher is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Force a hand-off on every registered dispatcher.
    pub fn flush_all(&self) {
        let dispatchers: Vec<_> = self.inner.lock().unwrap().values().cloned().collect();
        for dispatcher in dispatchers {
            dispatcher.flush();
        }
    }

    /// Shut down and deregister every dispatcher.
    ///
    /// Each drain task finishes its draining slot before exiting. Active
    /// batches are NOT flushed implicitly; call
    /// [`flush_all`](Self::flush_all) first to keep them.
    #[instrument(name = "registry_shutdown_all", skip(self))]
    pub async fn shutdown_all(&self) {
        let dispatchers: Vec<_> = {
            let mut inner = self.inner.lock().unwrap();
            inner.drain().map(|(_, d)| d).collect()
        };

        for dispatcher in dispatchers {
            dispatcher.shutdown().await;
        }

        info!("registry shutdown complete");
    }
}

impl<T> DispatcherRegistry<T>
where
    T: Debug + Serialize + Send + Sync + 'static,
{
    /// Build a registry from a loaded plan.
    ///
    /// Spawns one dispatcher per declaration, each with its own sink
    /// instance built from the referenced [`SinkSpec`](contracts::SinkSpec).
    #[instrument(
        name = "registry_from_plan",
        skip(plan),
        fields(dispatchers = plan.dispatchers.len(), sinks = plan.sinks.len())
    )]
    pub fn from_plan(plan: &DispatchPlan) -> Result<Self, DispatcherError> {
        let registry = Self::new(&plan.default_channel);

        for spec in &plan.dispatchers {
            let sink_spec = plan
                .sinks
                .iter()
                .find(|s| s.name == spec.sink)
                .ok_or_else(|| DispatcherError::UnknownSink {
                    dispatcher: spec.name.clone(),
                    sink: spec.sink.clone(),
                })?;

            let sink = build_sink(sink_spec, plan.console_severity)?;
            let config = spec.to_config()?;
            registry.register(
                spec.channel.clone(),
                Arc::new(BufferedDispatcher::spawn(config, sink)),
            );
        }

        Ok(registry)
    }
}
