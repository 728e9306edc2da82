use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::models::{DiskUsage, HostSnapshot, MemoryUsage, ProcessSample};
use crate::services::cpu_estimator::CpuEstimator;
use crate::services::host_probes;
use crate::services::identity::IdentityResolver;
use crate::services::process_table::{NativeProcessTable, ProcessSource};
use crate::services::procfs::ProcRoot;

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub proc_root: ProcRoot,
    /// statvfs 查询的挂载点
    pub disk_path: PathBuf,
    /// 进程扫描的最长时间，None 表示不限制
    pub scan_timeout: Option<Duration>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proc_root: ProcRoot::default(),
            disk_path: PathBuf::from("/"),
            scan_timeout: None,
        }
    }
}

/// 主机快照采集器
///
/// CPU 估算器是唯一跨请求共享的可变状态，放在 Mutex 中，
/// 其余探针每次调用都重新读取内核数据。
pub struct SnapshotCollector {
    config: CollectorConfig,
    cpu: Mutex<CpuEstimator>,
    processes: Box<dyn ProcessSource>,
}

impl SnapshotCollector {
    pub fn new(config: CollectorConfig, identities: Arc<IdentityResolver>) -> Self {
        let table = NativeProcessTable::new(config.proc_root.clone(), identities);
        Self::with_source(config, Box::new(table))
    }

    pub fn with_source(config: CollectorConfig, processes: Box<dyn ProcessSource>) -> Self {
        let cpu = Mutex::new(CpuEstimator::new(config.proc_root.clone()));
        Self {
            config,
            cpu,
            processes,
        }
    }

    fn estimator(&self) -> MutexGuard<'_, CpuEstimator> {
        // 估算器每次更新都是完整的一对计数，锁中毒后仍可继续使用
        self.cpu.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 读取失败时返回 None，基线保持不变
    pub fn try_cpu_usage(&self) -> Option<f64> {
        self.estimator().try_sample()
    }

    pub fn cpu_usage(&self) -> f64 {
        self.estimator().sample()
    }

    pub fn memory(&self) -> anyhow::Result<MemoryUsage> {
        host_probes::memory_usage(&self.config.proc_root)
    }

    pub fn disk(&self) -> anyhow::Result<DiskUsage> {
        host_probes::disk_usage(&self.config.disk_path)
    }

    pub fn uptime(&self) -> anyhow::Result<f64> {
        host_probes::uptime(&self.config.proc_root)
    }

    pub fn load_average(&self) -> anyhow::Result<[f64; 3]> {
        host_probes::load_average(&self.config.proc_root)
    }

    pub fn processes(&self) -> anyhow::Result<Vec<ProcessSample>> {
        let deadline = self.config.scan_timeout.map(|t| Instant::now() + t);
        self.processes.enumerate(deadline)
    }

    /// 采集一份完整快照
    ///
    /// 单个探针失败只会把对应字段置 0 并记入 `degraded`，不影响其他字段。
    pub fn collect(&self) -> HostSnapshot {
        let collected_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let mut degraded = Vec::new();

        let cpu_usage = self.try_cpu_usage().unwrap_or_else(|| {
            log::warn!("CPU probe failed, reporting 0%");
            degraded.push("cpu");
            0.0
        });
        let memory = degrade(self.memory(), "memory", &mut degraded);
        let disk = degrade(self.disk(), "disk", &mut degraded);
        let uptime = degrade(self.uptime(), "uptime", &mut degraded);
        let load_avg = degrade(self.load_average(), "load_avg", &mut degraded);
        let processes = degrade(self.processes(), "processes", &mut degraded);

        log::debug!(
            "Collected snapshot: cpu {:.1}%, {} processes, degraded {:?}",
            cpu_usage,
            processes.len(),
            degraded
        );

        HostSnapshot {
            cpu_usage,
            uptime,
            mem_total: memory.total,
            mem_used: memory.used,
            mem_free: memory.free,
            disk_total: disk.total,
            disk_used: disk.used,
            load_avg,
            process_count: processes.len(),
            collected_at,
            degraded,
            processes,
        }
    }
}

fn degrade<T: Default>(
    result: anyhow::Result<T>,
    probe: &'static str,
    degraded: &mut Vec<&'static str>,
) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("{} probe failed: {:#}", probe, e);
        degraded.push(probe);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::tests::FixedUsers;
    use crate::services::process_reader::tests::write_process;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn fake_proc(dir: &TempDir) {
        let root = dir.path();
        fs::write(root.join("stat"), "cpu  500 200 200 100 0 0 0 0 0 0\ncpu0 500 200 200 100 0 0 0 0 0 0\n").unwrap();
        fs::write(root.join("meminfo"), "MemTotal: 1000 kB\nMemFree: 100 kB\nMemAvailable: 250 kB\n").unwrap();
        fs::write(root.join("uptime"), "12345.67 45678.90\n").unwrap();
        fs::write(root.join("loadavg"), "1.00 0.50 0.25 1/100 4242\n").unwrap();
        fs::create_dir_all(root.join("self")).unwrap();
        write_process(root, 1, 0, 2048, b"/sbin/init\0");
        write_process(root, 4242, 1000, 300, b"bash\0");
        // 扫描期间退出的进程
        fs::create_dir_all(root.join("5000")).unwrap();
    }

    fn collector(dir: &TempDir) -> SnapshotCollector {
        let config = CollectorConfig {
            proc_root: ProcRoot::new(dir.path()),
            disk_path: dir.path().to_path_buf(),
            scan_timeout: None,
        };
        let users = FixedUsers::new(&[(0, "root"), (1000, "alice")]);
        SnapshotCollector::new(config, Arc::new(IdentityResolver::new(users)))
    }

    #[test]
    fn collects_every_probe() {
        let dir = TempDir::new().unwrap();
        fake_proc(&dir);

        let snapshot = collector(&dir).collect();
        assert!(snapshot.degraded.is_empty(), "degraded: {:?}", snapshot.degraded);
        assert!((snapshot.cpu_usage - 90.0).abs() < 1e-9);
        assert_eq!(snapshot.uptime, 12345.67);
        assert_eq!(snapshot.mem_total, 1_024_000);
        assert_eq!(snapshot.mem_used + snapshot.mem_free, snapshot.mem_total);
        assert!(snapshot.disk_used <= snapshot.disk_total);
        assert_eq!(snapshot.load_avg, [1.0, 0.5, 0.25]);
        assert_eq!(snapshot.process_count, 2);
        assert!(snapshot.collected_at > 0);

        let mut pids: Vec<i32> = snapshot.processes.iter().map(|p| p.pid).collect();
        pids.sort();
        assert_eq!(pids, vec![1, 4242]);
    }

    #[test]
    fn failed_probes_are_zero_filled() {
        let dir = TempDir::new().unwrap();
        fake_proc(&dir);
        fs::remove_file(dir.path().join("meminfo")).unwrap();
        fs::write(dir.path().join("uptime"), "garbage\n").unwrap();

        let snapshot = collector(&dir).collect();
        assert_eq!(snapshot.degraded, vec!["memory", "uptime"]);
        assert_eq!(snapshot.mem_total, 0);
        assert_eq!(snapshot.uptime, 0.0);
        // 其他探针不受影响
        assert_eq!(snapshot.process_count, 2);
        assert_eq!(snapshot.load_avg, [1.0, 0.5, 0.25]);
    }

    #[test]
    fn missing_stat_marks_cpu_degraded() {
        let dir = TempDir::new().unwrap();
        fake_proc(&dir);
        fs::remove_file(dir.path().join("stat")).unwrap();

        let snapshot = collector(&dir).collect();
        assert_eq!(snapshot.cpu_usage, 0.0);
        assert!(snapshot.degraded.contains(&"cpu"));
    }

    #[test]
    fn snapshot_serializes_expected_keys() {
        let dir = TempDir::new().unwrap();
        fake_proc(&dir);

        let value = serde_json::to_value(collector(&dir).collect()).unwrap();
        for key in ["cpu_usage", "uptime", "mem_total", "mem_used", "mem_free", "disk_total", "disk_used", "processes"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        let process = &value["processes"][0];
        for key in ["pid", "user", "rss", "vsz", "state", "command"] {
            assert!(process.get(key).is_some(), "missing process.{}", key);
        }
    }

    #[test]
    fn concurrent_collections_share_one_baseline() {
        let dir = TempDir::new().unwrap();
        fake_proc(&dir);
        let collector = Arc::new(collector(&dir));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let collector = collector.clone();
                thread::spawn(move || collector.collect().cpu_usage)
            })
            .collect();
        let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // 计数没有变化，只有第一个拿到锁的调用得到非零值
        assert_eq!(results.iter().filter(|v| **v > 0.0).count(), 1);
    }
}
