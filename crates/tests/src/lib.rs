//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 → registry → dispatcher → sink 端到端测试
//! - 并发生产者无丢失验证

#[cfg(test)]
mod contract_tests {
    use std::str::FromStr;

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::Severity::from_str("info").unwrap();
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ChannelId, ContractError, DispatcherConfig, RecordSink, Severity, SinkRecord};
    use dispatcher::{BufferedDispatcher, DispatcherRegistry};
    use serde::Serialize;

    /// A telemetry-style payload for end-to-end runs
    #[derive(Debug, Clone, Serialize)]
    struct JointSample {
        joint: String,
        position: f64,
    }

    /// Sink that collects forwarded payloads for assertions
    #[derive(Clone)]
    struct CollectingSink {
        name: String,
        records: Arc<Mutex<Vec<(usize, u32)>>>,
        write_count: Arc<AtomicU64>,
    }

    impl CollectingSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                records: Arc::new(Mutex::new(Vec::new())),
                write_count: Arc::new(AtomicU64::new(0)),
            }
        }
    }

    impl RecordSink<(usize, u32)> for CollectingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, entry: &SinkRecord<(usize, u32)>) -> Result<(), ContractError> {
            self.records.lock().unwrap().push(entry.record);
            self.write_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// End-to-end test: TOML plan -> registry -> dispatcher -> file sink
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 解析并校验 plan
    /// 2. DispatcherRegistry::from_plan 启动 dispatcher 与 sink
    /// 3. push / flush / shutdown 后记录落盘
    #[tokio::test]
    async fn test_e2e_plan_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("records.jsonl");

        let plan_toml = format!(
            r#"
default_channel = "robot"

[[dispatchers]]
channel = "telemetry"
level = "debug"
name = "joint_state"
max_batch_age_ms = 60000
max_batch_size = 100
sink = "archive"

[[sinks]]
name = "archive"
sink_type = "file"
params = {{ path = "{}" }}
"#,
            out_path.display()
        );

        let plan = ConfigLoader::load_from_str(&plan_toml, ConfigFormat::Toml).unwrap();
        let registry: DispatcherRegistry<JointSample> =
            DispatcherRegistry::from_plan(&plan).unwrap();

        let dispatcher = registry.get("telemetry").unwrap();
        for i in 0..10 {
            dispatcher.push(JointSample {
                joint: format!("joint_{i}"),
                position: i as f64 * 0.1,
            });
        }

        registry.flush_all();
        registry.shutdown_all().await;

        let content = std::fs::read_to_string(&out_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 10);

        // Envelope fields come from the dispatcher config
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["channel"], "telemetry");
        assert_eq!(first["level"], "debug");
        assert_eq!(first["source"], "joint_state");
        assert_eq!(first["record"]["joint"], "joint_0");
    }

    /// m 个生产者线程 × n 条记录：恰好 m*n 条到达 sink，
    /// 单个生产者内部保序。
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_no_loss() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: u32 = 500;

        let sink = CollectingSink::new("collect");
        let records = Arc::clone(&sink.records);

        let config = DispatcherConfig::new(
            ChannelId::from("telemetry"),
            Severity::Info,
            "stress",
            Duration::from_millis(50),
            64,
        )
        .unwrap();
        let dispatcher = Arc::new(BufferedDispatcher::spawn(config, sink));

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        dispatcher.push((producer, seq));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        dispatcher.flush();
        dispatcher.shutdown().await;

        let collected = records.lock().unwrap();
        assert_eq!(collected.len(), PRODUCERS * PER_PRODUCER as usize);

        // Per-producer push order is preserved; cross-producer
        // interleaving is unconstrained
        for producer in 0..PRODUCERS {
            let seqs: Vec<u32> = collected
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, s)| *s)
                .collect();
            assert_eq!(seqs.len(), PER_PRODUCER as usize);
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.pushed_count, (PRODUCERS * PER_PRODUCER as usize) as u64);
        assert_eq!(metrics.forwarded_count, metrics.pushed_count);
        assert_eq!(metrics.discarded_count, 0);
    }

    /// flush 前关停会丢弃 active 批次，且计入 discarded 指标
    #[tokio::test]
    async fn test_shutdown_without_flush_reports_discarded() {
        let sink = CollectingSink::new("collect");
        let records = Arc::clone(&sink.records);

        let config = DispatcherConfig::new(
            ChannelId::from("telemetry"),
            Severity::Info,
            "lossy",
            Duration::from_secs(3600),
            1000,
        )
        .unwrap();
        let dispatcher = BufferedDispatcher::spawn(config, sink);

        for seq in 0..5u32 {
            dispatcher.push((0, seq));
        }
        dispatcher.shutdown().await;

        assert!(records.lock().unwrap().is_empty());

        let snapshot = dispatcher.metrics();
        assert_eq!(snapshot.discarded_count, 5);

        // 指标导出在无 recorder 时也安全
        observability::record_dispatcher_metrics("telemetry", &snapshot);
    }

    /// registry 默认 channel 的惰性创建路径
    #[tokio::test]
    async fn test_registry_lazy_default_channel() {
        let registry: DispatcherRegistry<(usize, u32)> = DispatcherRegistry::new("robot");

        let sink = CollectingSink::new("collect");
        let records = Arc::clone(&sink.records);

        let dispatcher = registry
            .get_or_create("", |channel| {
                let config = DispatcherConfig::new(
                    ChannelId::from(channel),
                    Severity::Info,
                    "default",
                    Duration::from_secs(3600),
                    100,
                )?;
                Ok((config, sink))
            })
            .unwrap();

        assert_eq!(dispatcher.config().channel, "robot");
        dispatcher.push((1, 1));
        registry.flush_all();
        registry.shutdown_all().await;

        assert_eq!(records.lock().unwrap().as_slice(), &[(1, 1)]);
    }
}
