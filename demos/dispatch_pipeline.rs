//! Dispatch Pipeline Demo
//!
//! Demonstrates the full flow: load a dispatch plan (or fall back to a
//! built-in one), spawn dispatchers through the registry, push telemetry
//! from several producer threads, then flush and shut down gracefully.
//!
//! Run with: cargo run --bin dispatch_pipeline [plan.toml]

use std::sync::Arc;
use std::time::Duration;

use config_loader::{ConfigFormat, ConfigLoader};
use contracts::DispatchPlan;
use dispatcher::DispatcherRegistry;
use observability::{LogFormat, ObservabilityConfig};
use serde::Serialize;

/// Telemetry payload pushed by the demo producers
#[derive(Debug, Clone, Serialize)]
struct JointSample {
    joint: &'static str,
    position: f64,
    velocity: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; no Prometheus endpoint for a short-lived demo
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        metrics_port: None,
        default_log_level: "debug".to_string(),
    })?;

    tracing::info!("Starting Dispatch Pipeline Demo");

    // ==== Stage 1: Use default plan or load from file ====
    let plan = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading dispatch plan");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        default_plan()?
    };

    // ==== Stage 2: Spawn dispatchers ====
    let registry: Arc<DispatcherRegistry<JointSample>> =
        Arc::new(DispatcherRegistry::from_plan(&plan)?);
    tracing::info!(dispatchers = registry.len(), "Registry ready");

    // ==== Stage 3: Produce records from plain threads ====
    let telemetry = registry
        .get("telemetry")
        .expect("plan declares a telemetry dispatcher");

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let dispatcher = Arc::clone(&telemetry);
            std::thread::spawn(move || {
                for step in 0..250 {
                    dispatcher.push(JointSample {
                        joint: "shoulder_pan",
                        position: (producer * 250 + step) as f64 * 0.001,
                        velocity: 0.02,
                    });
                    std::thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();

    for producer in producers {
        let _ = producer.join();
    }

    // ==== Stage 4: Flush and shut down ====
    registry.flush_all();

    let snapshot = telemetry.metrics();
    observability::record_dispatcher_metrics("telemetry", &snapshot);
    tracing::info!(
        pushed = snapshot.pushed_count,
        forwarded = snapshot.forwarded_count,
        rotations = snapshot.rotation_count,
        "Producers finished"
    );

    registry.shutdown_all().await;
    tracing::info!("Demo complete");

    Ok(())
}

/// Built-in plan: one console dispatcher on the telemetry channel
fn default_plan() -> Result<DispatchPlan, contracts::ContractError> {
    ConfigLoader::load_from_str(
        r#"
default_channel = "robot"
console_severity = "debug"

[[dispatchers]]
channel = "telemetry"
level = "debug"
name = "joint_state"
max_batch_age_ms = 200
max_batch_size = 64
sink = "console"

[[sinks]]
name = "console"
sink_type = "log"
"#,
        ConfigFormat::Toml,
    )
}
