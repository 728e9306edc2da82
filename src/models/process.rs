use serde::{Deserialize, Serialize};

/// 单个进程的采样结果
///
/// 每次扫描都会重新生成。pid 只在本次扫描内有意义，进程退出后内核会复用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    /// 进程 ID
    pub pid: i32,
    /// 所属用户名，无法解析时为 "-"
    pub user: String,
    /// 常驻内存 (字节)
    pub rss: u64,
    /// 虚拟内存 (字节)
    pub vsz: u64,
    /// 进程状态码，例如 "S"、"R"、"Z"
    pub state: String,
    /// 命令行，参数之间以空格分隔；内核线程为空
    pub command: String,
}
