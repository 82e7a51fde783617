//! Dispatcher metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single dispatcher
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Entries currently buffered across both batch slots
    buffered_depth: AtomicUsize,
    /// Total records accepted by push
    pushed_count: AtomicU64,
    /// Total policy-triggered rotations (size or age)
    rotation_count: AtomicU64,
    /// Total explicit flushes that moved entries
    forced_flush_count: AtomicU64,
    /// Total entries forwarded to the sink
    forwarded_count: AtomicU64,
    /// Total sink write failures
    failure_count: AtomicU64,
    /// Entries dropped from the active batch at shutdown
    discarded_count: AtomicU64,
}

impl DispatcherMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current buffered depth
    pub fn buffered_depth(&self) -> usize {
        self.buffered_depth.load(Ordering::Relaxed)
    }

    /// Set current buffered depth
    pub fn set_buffered_depth(&self, depth: usize) {
        self.buffered_depth.store(depth, Ordering::Relaxed);
    }

    /// Get total pushed count
    pub fn pushed_count(&self) -> u64 {
        self.pushed_count.load(Ordering::Relaxed)
    }

    /// Increment pushed count
    pub fn inc_pushed_count(&self) {
        self.pushed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get rotation count
    pub fn rotation_count(&self) -> u64 {
        self.rotation_count.load(Ordering::Relaxed)
    }

    /// Increment rotation count
    pub fn inc_rotation_count(&self) {
        self.rotation_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get forced flush count
    pub fn forced_flush_count(&self) -> u64 {
        self.forced_flush_count.load(Ordering::Relaxed)
    }

    /// Increment forced flush count
    pub fn inc_forced_flush_count(&self) {
        self.forced_flush_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get forwarded count
    pub fn forwarded_count(&self) -> u64 {
        self.forwarded_count.load(Ordering::Relaxed)
    }

    /// Increment forwarded count
    pub fn inc_forwarded_count(&self) {
        self.forwarded_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get discarded count
    pub fn discarded_count(&self) -> u64 {
        self.discarded_count.load(Ordering::Relaxed)
    }

    /// Add to discarded count
    pub fn add_discarded_count(&self, n: u64) {
        self.discarded_count.fetch_add(n, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            buffered_depth: self.buffered_depth(),
            pushed_count: self.pushed_count(),
            rotation_count: self.rotation_count(),
            forced_flush_count: self.forced_flush_count(),
            forwarded_count: self.forwarded_count(),
            failure_count: self.failure_count(),
            discarded_count: self.discarded_count(),
        }
    }
}

/// Snapshot of dispatcher metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub buffered_depth: usize,
    pub pushed_count: u64,
    pub rotation_count: u64,
    pub forced_flush_count: u64,
    pub forwarded_count: u64,
    pub failure_count: u64,
    pub discarded_count: u64,
}
