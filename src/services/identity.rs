use nix::unistd::{Uid, User};
use std::collections::HashMap;
use std::sync::Mutex;

/// 无法解析的用户显示为该占位符
pub const UNKNOWN_OWNER: &str = "-";

/// 数字 uid 到用户名的查询
pub trait IdentityLookup: Send + Sync {
    fn lookup(&self, uid: u32) -> Option<String>;
}

/// 通过 getpwuid_r 查询主机用户数据库
pub struct SystemUsers;

impl IdentityLookup for SystemUsers {
    fn lookup(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|u| u.name),
            Err(e) => {
                log::debug!("User lookup for uid {} failed: {}", uid, e);
                None
            }
        }
    }
}

/// 带缓存的用户名解析器
///
/// 成功解析的结果永久缓存；某次查询失败时，若该 uid 曾经解析成功则返回缓存值。
pub struct IdentityResolver {
    lookup: Box<dyn IdentityLookup>,
    cache: Mutex<HashMap<u32, String>>,
}

impl IdentityResolver {
    pub fn new(lookup: impl IdentityLookup + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn system() -> Self {
        Self::new(SystemUsers)
    }

    pub fn resolve(&self, uid: u32) -> Option<String> {
        let cached = self.cache.lock().ok().and_then(|c| c.get(&uid).cloned());
        if cached.is_some() {
            return cached;
        }

        let name = self.lookup.lookup(uid)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(uid, name.clone());
        }
        Some(name)
    }

    pub fn display_name(&self, uid: u32) -> String {
        self.resolve(uid).unwrap_or_else(|| UNKNOWN_OWNER.to_string())
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::system()
    }
}
