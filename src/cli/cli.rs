use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Host Monitor - 本机资源监控 JSON 服务
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// 监听端口
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// 监听地址
    #[arg(short = 'a', long, env = "ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    /// procfs 挂载点
    #[arg(long, env = "PROC_ROOT", default_value = "/proc")]
    pub proc_root: PathBuf,

    /// 统计磁盘空间的挂载点
    #[arg(long, env = "DISK_PATH", default_value = "/")]
    pub disk_path: PathBuf,

    /// 进程扫描超时 (毫秒)，0 表示不限制
    #[arg(long, env = "SCAN_TIMEOUT_MS", default_value_t = 0)]
    pub scan_timeout_ms: u64,

    #[arg(long, env = "OS_RELEASE", default_value = "/etc/os-release")]
    pub os_release: PathBuf,

    /// 排序进程列表使用的 ps 程序
    #[arg(long, env = "PS_PROGRAM", default_value = "ps")]
    pub ps_program: String,

    /// 允许以 root 身份运行
    #[arg(long, env = "ALLOW_ROOT")]
    pub allow_root: bool,
}

impl CommandArgs {
    pub fn scan_timeout(&self) -> Option<Duration> {
        (self.scan_timeout_ms > 0).then(|| Duration::from_millis(self.scan_timeout_ms))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_arguments_are_parsed() {
        let args = CommandArgs::try_parse_from([
            "host-monitor",
            "--port",
            "9100",
            "-a",
            "0.0.0.0",
            "--proc-root",
            "/host/proc",
            "--scan-timeout-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(args.bind_address(), "0.0.0.0:9100");
        assert_eq!(args.proc_root, PathBuf::from("/host/proc"));
        assert_eq!(args.scan_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let args = CommandArgs::try_parse_from(["host-monitor", "--scan-timeout-ms", "0"]).unwrap();
        assert_eq!(args.scan_timeout(), None);
    }
}
