use serde::Serialize;

/// 主机标识信息
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub hostname: String,
    /// 发行版名称 (os-release 中的 PRETTY_NAME)
    pub distribution: String,
    /// 内核版本
    pub kernel: String,
    pub arch: String,
}

/// `df` 输出中的一行，保留其人类可读的格式
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilesystemEntry {
    pub filesystem: String,
    pub size: String,
    pub used: String,
    pub avail: String,
    #[serde(rename = "usePercent")]
    pub use_percent: String,
    pub mounted: String,
}
