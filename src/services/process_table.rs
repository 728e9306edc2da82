use anyhow::{bail, Context};
use regex::Regex;
use std::fs;
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use crate::models::ProcessSample;
use crate::services::identity::IdentityResolver;
use crate::services::process_reader::ProcessReader;
use crate::services::procfs::ProcRoot;

/// 进程列表的数据来源
///
/// `deadline` 到期后返回已经收集到的部分结果。
pub trait ProcessSource: Send + Sync {
    fn enumerate(&self, deadline: Option<Instant>) -> anyhow::Result<Vec<ProcessSample>>;
}

/// 直接扫描 /proc 的进程表
pub struct NativeProcessTable {
    proc_root: ProcRoot,
    reader: ProcessReader,
}

impl NativeProcessTable {
    pub fn new(proc_root: ProcRoot, identities: Arc<IdentityResolver>) -> Self {
        let reader = ProcessReader::new(proc_root.clone(), identities);
        Self { proc_root, reader }
    }

    /// 列出目录中所有数字名称的条目，其余如 `self`、`sys` 被忽略
    pub fn list_pids(&self) -> anyhow::Result<Vec<i32>> {
        let entries = fs::read_dir(self.proc_root.path()).with_context(|| {
            format!("failed to list {}", self.proc_root.path().display())
        })?;

        Ok(entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
            .filter(|pid| *pid > 0)
            .collect())
    }
}

impl ProcessSource for NativeProcessTable {
    fn enumerate(&self, deadline: Option<Instant>) -> anyhow::Result<Vec<ProcessSample>> {
        let pids = self.list_pids()?;
        let mut processes = Vec::with_capacity(pids.len());

        for (scanned, pid) in pids.iter().enumerate() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::warn!(
                    "Process scan deadline reached after {}/{} entries, returning partial list",
                    scanned,
                    pids.len()
                );
                break;
            }
            if let Some(sample) = self.reader.read(*pid) {
                processes.push(sample);
            }
        }

        log::debug!("Scanned {} pids, {} processes readable", pids.len(), processes.len());
        Ok(processes)
    }
}

const RANKED_ARGS: [&str; 3] = ["-eo", "pid=,user=,rss=,vsz=,stat=,args=", "--sort=-pcpu"];

/// 通过 `ps` 获取按 CPU 占用排序的进程列表
pub struct RankedProcessTable {
    program: String,
}

impl RankedProcessTable {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for RankedProcessTable {
    fn default() -> Self {
        Self::new("ps")
    }
}

impl ProcessSource for RankedProcessTable {
    fn enumerate(&self, _deadline: Option<Instant>) -> anyhow::Result<Vec<ProcessSample>> {
        let output = Command::new(&self.program)
            .args(RANKED_ARGS)
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(parse_ranked_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// 解析 `pid user rss vsz stat args...` 格式的输出
///
/// 列数不足或 pid 非数字的行直接跳过。rss/vsz 单位为 KiB。
pub fn parse_ranked_output(text: &str) -> Vec<ProcessSample> {
    text.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            let pid = fields[0].parse().ok()?;
            let kib = |s: &str| s.parse::<u64>().unwrap_or(0).saturating_mul(1024);

            Some(ProcessSample {
                pid,
                user: fields[1].to_string(),
                rss: kib(fields[2]),
                vsz: kib(fields[3]),
                state: fields[4].to_string(),
                command: fields[5..].join(" "),
            })
        })
        .collect()
}

/// 命令行过滤条件：合法的正则按正则匹配，否则退化为子串匹配
pub enum CommandFilter {
    Pattern(Regex),
    Substring(String),
}

impl CommandFilter {
    pub fn new(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(r) => Self::Pattern(r),
            Err(e) => {
                log::debug!("Invalid filter regex '{}' ({}), using substring match", pattern, e);
                Self::Substring(pattern.to_string())
            }
        }
    }

    pub fn matches(&self, sample: &ProcessSample) -> bool {
        match self {
            Self::Pattern(r) => r.is_match(&sample.command),
            Self::Substring(s) => sample.command.contains(s.as_str()),
        }
    }

    pub fn apply(&self, processes: Vec<ProcessSample>) -> Vec<ProcessSample> {
        processes.into_iter().filter(|p| self.matches(p)).collect()
    }
}
