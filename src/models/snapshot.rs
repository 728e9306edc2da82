use serde::Serialize;

use crate::models::ProcessSample;

/// 一次采集得到的主机快照
///
/// 各项指标在同一次调用内先后读取，彼此之间存在微小的时间差，
/// 并不是同一瞬间的原子快照。`collected_at` 记录采集开始的时间。
#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    /// CPU 使用率 (百分比，0-100)
    pub cpu_usage: f64,
    /// 开机时长 (秒)
    pub uptime: f64,
    pub mem_total: u64,
    pub mem_used: u64,
    pub mem_free: u64,
    pub disk_total: u64,
    pub disk_used: u64,
    /// 1 / 5 / 15 分钟平均负载
    pub load_avg: [f64; 3],
    pub process_count: usize,
    /// 采集开始时间 (Unix 毫秒)
    pub collected_at: u64,
    /// 采集失败并以 0 填充的探针名称
    pub degraded: Vec<&'static str>,
    pub processes: Vec<ProcessSample>,
}

/// 内存使用情况 (字节)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl MemoryUsage {
    /// 由 meminfo 中的 kB 数值构造，`available_kib` 不得大于 `total_kib`
    pub fn from_kib(total_kib: u64, available_kib: u64) -> Self {
        let available_kib = available_kib.min(total_kib);
        let used_kib = total_kib - available_kib;
        let percent = if total_kib > 0 {
            used_kib as f64 / total_kib as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total: total_kib.saturating_mul(1024),
            used: used_kib.saturating_mul(1024),
            free: available_kib.saturating_mul(1024),
            percent,
        }
    }
}

/// 文件系统空间使用情况 (字节)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

impl DiskUsage {
    pub fn from_blocks(blocks: u64, block_size: u64, free_blocks: u64) -> Self {
        let total = blocks.saturating_mul(block_size);
        let free = free_blocks.saturating_mul(block_size).min(total);
        let used = total - free;
        let percent = if total > 0 {
            used as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            used,
            free,
            percent,
        }
    }
}
