use prometheus::{
    Encoder, Gauge, GaugeVec, IntGauge, Opts, Registry, TextEncoder,
    register_gauge_vec_with_registry, register_gauge_with_registry,
    register_int_gauge_with_registry,
};
use lazy_static::lazy_static;
use std::sync::Arc;

use crate::models::HostSnapshot;

const LOAD_WINDOWS: [&str; 3] = ["1m", "5m", "15m"];

pub struct MetricsRegistry {
    registry: Registry,

    pub cpu_usage: Gauge,
    pub uptime: Gauge,
    pub memory_total_bytes: Gauge,
    pub memory_used_bytes: Gauge,
    pub memory_free_bytes: Gauge,
    pub disk_total_bytes: Gauge,
    pub disk_used_bytes: Gauge,
    pub load_average: GaugeVec,
    pub process_count: IntGauge,
    /// 每个探针最近一次采集是否失败 (1 = 失败)
    pub probe_degraded: GaugeVec,
    pub last_collect_timestamp: Gauge,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let registry = Registry::new();

        let cpu_usage = register_gauge_with_registry!(
            Opts::new("host_cpu_usage_percent", "Host CPU usage percentage since the previous sample"),
            registry
        ).unwrap();

        let uptime = register_gauge_with_registry!(
            Opts::new("host_uptime_seconds", "Seconds since boot"),
            registry
        ).unwrap();

        let memory_total_bytes = register_gauge_with_registry!(
            Opts::new("host_memory_total_bytes", "Total physical memory in bytes"),
            registry
        ).unwrap();

        let memory_used_bytes = register_gauge_with_registry!(
            Opts::new("host_memory_used_bytes", "Memory in use (total minus available) in bytes"),
            registry
        ).unwrap();

        let memory_free_bytes = register_gauge_with_registry!(
            Opts::new("host_memory_free_bytes", "Available memory in bytes"),
            registry
        ).unwrap();

        let disk_total_bytes = register_gauge_with_registry!(
            Opts::new("host_disk_total_bytes", "Root filesystem size in bytes"),
            registry
        ).unwrap();

        let disk_used_bytes = register_gauge_with_registry!(
            Opts::new("host_disk_used_bytes", "Root filesystem used bytes"),
            registry
        ).unwrap();

        let load_average = register_gauge_vec_with_registry!(
            Opts::new("host_load_average", "System load average"),
            &["window"],
            registry
        ).unwrap();

        let process_count = register_int_gauge_with_registry!(
            Opts::new("host_process_count", "Number of processes in the last scan"),
            registry
        ).unwrap();

        let probe_degraded = register_gauge_vec_with_registry!(
            Opts::new("host_probe_degraded", "Probe failed during the last collection (1) or succeeded (0)"),
            &["probe"],
            registry
        ).unwrap();

        let last_collect_timestamp = register_gauge_with_registry!(
            Opts::new("host_last_collect_timestamp_seconds", "Unix timestamp of the last collection"),
            registry
        ).unwrap();

        Self {
            registry,
            cpu_usage,
            uptime,
            memory_total_bytes,
            memory_used_bytes,
            memory_free_bytes,
            disk_total_bytes,
            disk_used_bytes,
            load_average,
            process_count,
            probe_degraded,
            last_collect_timestamp,
        }
    }

    /// 用最新快照刷新所有 gauge
    pub fn observe(&self, snapshot: &HostSnapshot) {
        self.cpu_usage.set(snapshot.cpu_usage);
        self.uptime.set(snapshot.uptime);
        self.memory_total_bytes.set(snapshot.mem_total as f64);
        self.memory_used_bytes.set(snapshot.mem_used as f64);
        self.memory_free_bytes.set(snapshot.mem_free as f64);
        self.disk_total_bytes.set(snapshot.disk_total as f64);
        self.disk_used_bytes.set(snapshot.disk_used as f64);
        self.process_count.set(snapshot.process_count as i64);
        self.last_collect_timestamp.set(snapshot.collected_at as f64 / 1000.0);

        for (window, value) in LOAD_WINDOWS.iter().zip(snapshot.load_avg) {
            self.load_average.with_label_values(&[*window]).set(value);
        }

        for probe in ["cpu", "memory", "disk", "uptime", "load_avg", "processes"] {
            let failed = snapshot.degraded.contains(&probe);
            self.probe_degraded
                .with_label_values(&[probe])
                .set(if failed { 1.0 } else { 0.0 });
        }
    }

    pub fn render(&self) -> Result<String, Box<dyn std::error::Error>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    pub static ref METRICS: Arc<MetricsRegistry> = Arc::new(MetricsRegistry::new());
}
