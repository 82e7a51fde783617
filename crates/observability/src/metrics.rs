//! Dispatcher 指标收集模块
//!
//! 基于 MetricsSnapshot 收集和导出分发器的运行指标。

use dispatcher::MetricsSnapshot;
use metrics::{counter, gauge};

/// 从 MetricsSnapshot 记录指标
///
/// 周期性（或在关停前）为每个 dispatcher 调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_dispatcher_metrics;
///
/// record_dispatcher_metrics("telemetry", &dispatcher.metrics());
/// ```
pub fn record_dispatcher_metrics(channel: &str, snapshot: &MetricsSnapshot) {
    // 当前缓冲深度
    gauge!(
        "dispatcher_buffered_depth",
        "channel" => channel.to_string()
    )
    .set(snapshot.buffered_depth as f64);

    // 累计推入记录数
    counter!(
        "dispatcher_records_pushed_total",
        "channel" => channel.to_string()
    )
    .absolute(snapshot.pushed_count);

    // 累计转发记录数
    counter!(
        "dispatcher_records_forwarded_total",
        "channel" => channel.to_string()
    )
    .absolute(snapshot.forwarded_count);

    // 轮转与强制 flush
    counter!(
        "dispatcher_batch_rotations_total",
        "channel" => channel.to_string()
    )
    .absolute(snapshot.rotation_count);
    counter!(
        "dispatcher_forced_flushes_total",
        "channel" => channel.to_string()
    )
    .absolute(snapshot.forced_flush_count);

    // sink 写失败
    if snapshot.failure_count > 0 {
        counter!(
            "dispatcher_sink_write_failures_total",
            "channel" => channel.to_string()
        )
        .absolute(snapshot.failure_count);
    }

    // 关停时丢弃的记录
    if snapshot.discarded_count > 0 {
        counter!(
            "dispatcher_records_discarded_total",
            "channel" => channel.to_string()
        )
        .absolute(snapshot.discarded_count);
    }
}
