//! # Dispatcher
//!
//! 缓冲记录分发模块。
//!
//! 负责：
//! - 非阻塞接收生产者记录（push / flush）
//! - 双批次轮转与 flush 策略（size / age）
//! - 单一后台 drain 任务按序转发到 sink

mod batch;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod sinks;

pub use contracts::{DispatcherConfig, RecordSink, SinkRecord};
pub use dispatcher::BufferedDispatcher;
pub use error::DispatcherError;
pub use metrics::{DispatcherMetrics, MetricsSnapshot};
pub use registry::DispatcherRegistry;
pub use sinks::{build_sink, JsonFileSink, LogSink, PlanSink};
