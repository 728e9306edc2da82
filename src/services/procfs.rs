use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 内核伪文件系统的根目录
///
/// 生产环境为 `/proc`，测试中指向一个临时目录。
#[derive(Debug, Clone)]
pub struct ProcRoot {
    root: PathBuf,
}

impl ProcRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(name))
    }

    pub fn pid_path(&self, pid: i32, name: &str) -> PathBuf {
        self.root.join(pid.to_string()).join(name)
    }
}

impl Default for ProcRoot {
    fn default() -> Self {
        Self::new("/proc")
    }
}

/// 查找 `label:` 开头的行，返回冒号之后去掉空白的部分
///
/// 标签必须完整匹配，`VmRSS` 不会命中 `VmRSSx:`。
pub fn field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let value = line.strip_prefix(label)?.strip_prefix(':')?;
        Some(value.trim())
    })
}

/// 字段值的第一个空白分隔的 token
pub fn first_token<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    field(text, label)?.split_whitespace().next()
}

/// 读取形如 `MemTotal:  16314708 kB` 的数值部分 (单位 kB)
pub fn kib_value(text: &str, label: &str) -> Option<u64> {
    first_token(text, label)?.parse().ok()
}

/// 同 [`kib_value`]，换算为字节
pub fn kib_bytes(text: &str, label: &str) -> Option<u64> {
    kib_value(text, label)?.checked_mul(1024)
}
