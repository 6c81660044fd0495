//! 存储模块 - 本地持久化层
//!
//! - `entities`：数据实体定义
//! - `kv`：基于 sled 的本地 KV 存储，键带版本命名空间，写入后触发变更通知
//!
//! 本地数据只作为远端不可用时的兜底副本，远端读取成功时整体以远端为准。

use serde::{Deserialize, Serialize};

pub mod entities;
pub mod kv;

pub use entities::*;
pub use kv::KvStore;

/// 本地存储的逻辑键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalKey {
    Posts,
    Categories,
    Messages,
    Monetization,
    Subs,
}

impl LocalKey {
    /// 逻辑名（物理键的最后一段）
    pub fn logical_name(&self) -> &'static str {
        match self {
            LocalKey::Posts => "posts",
            LocalKey::Categories => "categories",
            LocalKey::Messages => "messages",
            LocalKey::Monetization => "monetization",
            LocalKey::Subs => "subs",
        }
    }
}

impl std::fmt::Display for LocalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.logical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_names() {
        assert_eq!(LocalKey::Posts.logical_name(), "posts");
        assert_eq!(LocalKey::Monetization.logical_name(), "monetization");
        assert_eq!(LocalKey::Messages.to_string(), "messages");
    }
}
