use anyhow::{bail, Context};
use nix::sys::statvfs::statvfs;
use std::path::Path;

use crate::models::{DiskUsage, MemoryUsage};
use crate::services::procfs::{self, ProcRoot};

pub fn memory_usage(proc_root: &ProcRoot) -> anyhow::Result<MemoryUsage> {
    let meminfo = proc_root
        .read("meminfo")
        .with_context(|| format!("failed to read {}/meminfo", proc_root.path().display()))?;
    parse_meminfo(&meminfo)
}

/// MemTotal 为 0 或缺失视为内核数据异常
///
/// 旧内核 (3.14 之前) 没有 MemAvailable，此时退回到 MemFree。
pub fn parse_meminfo(meminfo: &str) -> anyhow::Result<MemoryUsage> {
    let total = procfs::kib_value(meminfo, "MemTotal").unwrap_or(0);
    if total == 0 {
        bail!("meminfo reports no usable MemTotal");
    }

    let available = procfs::kib_value(meminfo, "MemAvailable")
        .or_else(|| procfs::kib_value(meminfo, "MemFree"))
        .context("meminfo has neither MemAvailable nor MemFree")?;

    Ok(MemoryUsage::from_kib(total, available))
}

pub fn disk_usage(path: &Path) -> anyhow::Result<DiskUsage> {
    let stats = statvfs(path).with_context(|| format!("statvfs {} failed", path.display()))?;

    // f_blocks 以 f_frsize 为单位
    let block_size = match stats.fragment_size() as u64 {
        0 => stats.block_size() as u64,
        size => size,
    };

    Ok(DiskUsage::from_blocks(
        stats.blocks() as u64,
        block_size,
        stats.blocks_free() as u64,
    ))
}

pub fn uptime(proc_root: &ProcRoot) -> anyhow::Result<f64> {
    let text = proc_root
        .read("uptime")
        .with_context(|| format!("failed to read {}/uptime", proc_root.path().display()))?;
    parse_uptime(&text)
}

pub fn parse_uptime(text: &str) -> anyhow::Result<f64> {
    let seconds: f64 = text
        .split_whitespace()
        .next()
        .context("uptime is empty")?
        .parse()
        .context("uptime is not a number")?;

    if !seconds.is_finite() || seconds < 0.0 {
        bail!("uptime out of range: {}", seconds);
    }
    Ok(seconds)
}

pub fn load_average(proc_root: &ProcRoot) -> anyhow::Result<[f64; 3]> {
    let text = proc_root
        .read("loadavg")
        .with_context(|| format!("failed to read {}/loadavg", proc_root.path().display()))?;
    parse_loadavg(&text)
}

pub fn parse_loadavg(text: &str) -> anyhow::Result<[f64; 3]> {
    let mut values = text.split_whitespace().map(|v| v.parse::<f64>());
    let mut load = [0.0; 3];
    for slot in load.iter_mut() {
        *slot = values
            .next()
            .context("loadavg has fewer than three values")?
            .context("loadavg value is not a number")?;
    }
    Ok(load)
}
