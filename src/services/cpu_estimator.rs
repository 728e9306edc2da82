use crate::services::procfs::ProcRoot;

/// `/proc/stat` 中汇总 `cpu` 行的累计 tick 数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCounters {
    pub idle: u64,
    pub total: u64,
}

/// 解析汇总 `cpu` 行。idle 为第 4 列，total 为所有列之和。
pub fn parse_cpu_counters(stat: &str) -> Option<CpuCounters> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let values = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let idle = *values.get(3)?;
    let total = values
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(*v))?;

    Some(CpuCounters { idle, total })
}

/// CPU 使用率估算器
///
/// 使用率是两次采样之间的比率，因此必须保留上一次的计数。
/// `sample` 需要 `&mut self`，并发调用方要自行加锁或各持一个实例。
pub struct CpuEstimator {
    proc_root: ProcRoot,
    previous: CpuCounters,
}

impl CpuEstimator {
    pub fn new(proc_root: ProcRoot) -> Self {
        Self {
            proc_root,
            previous: CpuCounters::default(),
        }
    }

    #[cfg(test)]
    pub fn baseline(&self) -> CpuCounters {
        self.previous
    }

    /// 返回自上次采样以来的 CPU 使用率，读取失败时返回 0
    pub fn sample(&mut self) -> f64 {
        self.try_sample().unwrap_or(0.0)
    }

    /// 读取失败时返回 None 且不修改基线
    pub fn try_sample(&mut self) -> Option<f64> {
        let stat = match self.proc_root.read("stat") {
            Ok(s) => s,
            Err(e) => {
                log::debug!("Failed to read {}/stat: {}", self.proc_root.path().display(), e);
                return None;
            }
        };

        let Some(current) = parse_cpu_counters(&stat) else {
            log::debug!("Malformed cpu line in {}/stat", self.proc_root.path().display());
            return None;
        };

        Some(self.advance(current))
    }

    fn advance(&mut self, current: CpuCounters) -> f64 {
        let previous = self.previous;

        if current.total < previous.total || current.idle < previous.idle {
            log::warn!(
                "CPU counters went backwards (total {} -> {}, idle {} -> {}), restarting baseline",
                previous.total,
                current.total,
                previous.idle,
                current.idle
            );
            self.previous = current;
            return 0.0;
        }

        // 分母为 0 时不采纳本次读数
        let delta_total = current.total - previous.total;
        if delta_total == 0 {
            return 0.0;
        }
        self.previous = current;
        let delta_idle = current.idle - previous.idle;

        (100.0 * (1.0 - delta_idle as f64 / delta_total as f64)).clamp(0.0, 100.0)
    }
}
