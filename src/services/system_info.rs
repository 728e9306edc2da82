use anyhow::{bail, Context};
use std::fs;
use std::path::Path;
use std::process::Command;
use sysinfo::System;

use crate::models::{FilesystemEntry, SystemInfo};

pub fn system_info(os_release: &Path) -> SystemInfo {
    let distribution = fs::read_to_string(os_release)
        .ok()
        .and_then(|text| pretty_name(&text))
        .or_else(System::long_os_version)
        .unwrap_or_else(|| "Unknown".to_string());

    SystemInfo {
        hostname: System::host_name().unwrap_or_default(),
        distribution,
        kernel: System::kernel_version().unwrap_or_default(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

/// 取 os-release 中的 PRETTY_NAME，去掉引号
pub fn pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|l| l.strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|v| !v.is_empty())
}

/// 运行 `df -h -P`，返回每个挂载点的一行摘要
pub fn filesystem_summary() -> anyhow::Result<Vec<FilesystemEntry>> {
    let output = Command::new("df")
        .args(["-h", "-P"])
        .output()
        .context("failed to run df")?;

    // 部分挂载点不可访问时 df 返回非零，但 stdout 仍然可用
    if !output.status.success() && output.stdout.is_empty() {
        bail!(
            "df exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_df_output(&String::from_utf8_lossy(&output.stdout)))
}

pub fn parse_df_output(text: &str) -> Vec<FilesystemEntry> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            Some(FilesystemEntry {
                filesystem: fields[0].to_string(),
                size: fields[1].to_string(),
                used: fields[2].to_string(),
                avail: fields[3].to_string(),
                use_percent: fields[4].to_string(),
                mounted: fields[5..].join(" "),
            })
        })
        .collect()
}
