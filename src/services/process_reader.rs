use nix::errno::Errno;
use std::fs;
use std::io;
use std::sync::Arc;

use crate::models::ProcessSample;
use crate::services::identity::{IdentityResolver, UNKNOWN_OWNER};
use crate::services::procfs::{self, ProcRoot};

/// status 文件中关心的字段，缺失时取默认值
#[derive(Debug, Default, PartialEq)]
struct StatusRecord {
    rss: u64,
    vsz: u64,
    state: String,
    uid: Option<u32>,
}

fn parse_status(status: &str) -> StatusRecord {
    StatusRecord {
        rss: procfs::kib_bytes(status, "VmRSS").unwrap_or(0),
        vsz: procfs::kib_bytes(status, "VmSize").unwrap_or(0),
        state: procfs::first_token(status, "State")
            .unwrap_or_default()
            .to_string(),
        // 第一列为真实 uid
        uid: procfs::first_token(status, "Uid").and_then(|s| s.parse().ok()),
    }
}

/// 将以 NUL 分隔的 cmdline 转为以空格分隔的字符串
pub fn command_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .replace('\0', " ")
}

/// 进程在两次读取之间退出时会返回 ENOENT 或 ESRCH
fn process_gone(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(Errno::ESRCH as i32)
}

/// 读取单个进程的 status 与 cmdline
pub struct ProcessReader {
    proc_root: ProcRoot,
    identities: Arc<IdentityResolver>,
}

impl ProcessReader {
    pub fn new(proc_root: ProcRoot, identities: Arc<IdentityResolver>) -> Self {
        Self {
            proc_root,
            identities,
        }
    }

    /// 进程已不存在时返回 None，调用方直接跳过即可
    pub fn read(&self, pid: i32) -> Option<ProcessSample> {
        // Name 字段是进程自行设置的 comm，可能含非 UTF-8 字节
        let status = match fs::read(self.proc_root.pid_path(pid, "status")) {
            Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
            Err(e) => {
                if !process_gone(&e) {
                    log::debug!("Skipping pid {}: status unreadable: {}", pid, e);
                }
                return None;
            }
        };

        let command = match fs::read(self.proc_root.pid_path(pid, "cmdline")) {
            Ok(raw) => command_line(&raw),
            Err(e) if process_gone(&e) => return None,
            Err(e) => {
                log::debug!("cmdline of pid {} unreadable: {}", pid, e);
                String::new()
            }
        };

        let record = parse_status(&status);
        let user = match record.uid {
            Some(uid) => self.identities.display_name(uid),
            None => UNKNOWN_OWNER.to_string(),
        };

        Some(ProcessSample {
            pid,
            user,
            rss: record.rss,
            vsz: record.vsz,
            state: record.state,
            command,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::identity::tests::FixedUsers;
    use std::path::Path;
    use tempfile::TempDir;

    pub(crate) fn write_process(root: &Path, pid: i32, uid: u32, rss_kib: u64, cmdline: &[u8]) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        let status = format!(
            "Name:\tproc{pid}\nState:\tS (sleeping)\nPid:\t{pid}\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\nVmSize:\t{} kB\nVmRSS:\t{rss_kib} kB\n",
            rss_kib * 4
        );
        fs::write(dir.join("status"), status).unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    fn reader(dir: &TempDir) -> ProcessReader {
        let users = FixedUsers::new(&[(0, "root"), (1000, "alice")]);
        ProcessReader::new(
            ProcRoot::new(dir.path()),
            Arc::new(IdentityResolver::new(users)),
        )
    }

    #[test]
    fn reads_status_and_cmdline() {
        let dir = TempDir::new().unwrap();
        write_process(dir.path(), 42, 1000, 100, b"/usr/bin/python3\0-m\0http.server\0");

        let sample = reader(&dir).read(42).unwrap();
        assert_eq!(sample.pid, 42);
        assert_eq!(sample.user, "alice");
        assert_eq!(sample.rss, 100 * 1024);
        assert_eq!(sample.vsz, 400 * 1024);
        assert_eq!(sample.state, "S");
        assert_eq!(sample.command, "/usr/bin/python3 -m http.server");
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let dir = TempDir::new().unwrap();
        let proc_dir = dir.path().join("2");
        fs::create_dir_all(&proc_dir).unwrap();
        fs::write(proc_dir.join("status"), "Name:\tkthreadd\nState:\tS (sleeping)\nUid:\t0\t0\t0\t0\n").unwrap();
        fs::write(proc_dir.join("cmdline"), b"").unwrap();

        let sample = reader(&dir).read(2).unwrap();
        assert_eq!(sample.rss, 0);
        assert_eq!(sample.vsz, 0);
        assert_eq!(sample.user, "root");
        assert_eq!(sample.command, "");
    }

    #[test]
    fn unknown_or_absent_uid_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        write_process(dir.path(), 7, 5555, 1, b"daemon\0");
        let proc_dir = dir.path().join("8");
        fs::create_dir_all(&proc_dir).unwrap();
        fs::write(proc_dir.join("status"), "Name:\tx\n").unwrap();
        fs::write(proc_dir.join("cmdline"), b"x\0").unwrap();

        let reader = reader(&dir);
        assert_eq!(reader.read(7).unwrap().user, UNKNOWN_OWNER);
        let sample = reader.read(8).unwrap();
        assert_eq!(sample.user, UNKNOWN_OWNER);
        assert_eq!(sample.state, "");
    }

    #[test]
    fn vanished_process_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(reader(&dir).read(31337).is_none());

        // status 读到了，但 cmdline 已消失
        let proc_dir = dir.path().join("9");
        fs::create_dir_all(&proc_dir).unwrap();
        fs::write(proc_dir.join("status"), "State:\tZ (zombie)\n").unwrap();
        assert!(reader(&dir).read(9).is_none());
    }

    #[test]
    fn non_utf8_name_is_still_reported() {
        let dir = TempDir::new().unwrap();
        let proc_dir = dir.path().join("77");
        fs::create_dir_all(&proc_dir).unwrap();
        fs::write(
            proc_dir.join("status"),
            b"Name:\tev\xffil\nState:\tR (running)\nUid:\t1000\t1000\t1000\t1000\nVmRSS:\t8 kB\n",
        )
        .unwrap();
        fs::write(proc_dir.join("cmdline"), b"./evil\0").unwrap();

        let sample = reader(&dir).read(77).unwrap();
        assert_eq!(sample.user, "alice");
        assert_eq!(sample.state, "R");
        assert_eq!(sample.rss, 8 * 1024);
        assert_eq!(sample.command, "./evil");
    }

    #[test]
    fn command_line_handles_separators() {
        assert_eq!(command_line(b"a\0b\0c\0"), "a b c");
        assert_eq!(command_line(b"single"), "single");
        assert_eq!(command_line(b""), "");
    }
}
