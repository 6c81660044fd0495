//! KV 存储模块 - 基于 sled 的本地键值存储
//!
//! 本模块提供：
//! - 带版本命名空间的键（`{prefix}_{version}_{logical}`），旧布局不会被覆盖
//! - JSON 序列化的值
//! - 读取永不失败：缺失、损坏或读错误都返回调用方给出的默认值
//! - 写入落盘后同步触发 `DataChanged` 事件

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::LocalKey;
use crate::config::StorageConfig;
use crate::error::{Result, RichacksSDKError};
use crate::events::{EventManager, SDKEvent};

/// KV 存储组件
pub struct KvStore {
    base_path: PathBuf,
    db: Db,
    key_prefix: String,
    schema_version: String,
    event_manager: Arc<EventManager>,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("base_path", &self.base_path)
            .field("key_prefix", &self.key_prefix)
            .field("schema_version", &self.schema_version)
            .finish()
    }
}

impl KvStore {
    /// 打开（或创建）KV 存储
    pub async fn open(config: &StorageConfig, event_manager: Arc<EventManager>) -> Result<Self> {
        let base_path = config.data_dir.clone();
        let kv_path = base_path.join("kv");

        tokio::fs::create_dir_all(&kv_path)
            .await
            .map_err(|e| RichacksSDKError::IO(format!("创建 KV 存储目录失败: {}", e)))?;

        let db = open_with_retry(&kv_path).await?;

        info!("✅ KV 存储已打开: {}", kv_path.display());

        Ok(Self {
            base_path,
            db,
            key_prefix: config.key_prefix.clone(),
            schema_version: config.schema_version.clone(),
            event_manager,
        })
    }

    /// 物理键：`{prefix}_{version}_{logical}`
    pub fn physical_key(&self, key: LocalKey) -> String {
        format!(
            "{}_{}_{}",
            self.key_prefix,
            self.schema_version,
            key.logical_name()
        )
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn event_manager(&self) -> &Arc<EventManager> {
        &self.event_manager
    }

    /// 读取键值；缺失或损坏时返回 `default`
    pub async fn get_or<T>(&self, key: LocalKey, default: T) -> T
    where
        T: DeserializeOwned,
    {
        let physical = self.physical_key(key);

        match self.db.get(physical.as_bytes()) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!("本地数据损坏，按缺失处理: key={}, error={}", physical, e);
                    default
                }
            },
            Ok(None) => {
                debug!("本地数据不存在，使用默认值: key={}", physical);
                default
            }
            Err(e) => {
                warn!("读取本地数据失败，使用默认值: key={}, error={}", physical, e);
                default
            }
        }
    }

    /// 读取原始字节（不反序列化）
    pub fn get_raw(&self, key: LocalKey) -> Option<Vec<u8>> {
        let physical = self.physical_key(key);
        self.db
            .get(physical.as_bytes())
            .ok()
            .flatten()
            .map(|v| v.to_vec())
    }

    /// 序列化并持久化，然后触发变更通知
    pub async fn set<T>(&self, key: LocalKey, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let physical = self.physical_key(key);
        let value_bytes = serde_json::to_vec(value)
            .map_err(|e| RichacksSDKError::Serialization(format!("序列化值失败: {}", e)))?;

        self.db
            .insert(physical.as_bytes(), value_bytes)
            .map_err(|e| RichacksSDKError::KvStore(format!("设置键值对失败: {}", e)))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| RichacksSDKError::KvStore(format!("刷盘失败: {}", e)))?;

        debug!("本地写入完成: key={}", physical);

        self.event_manager.emit(SDKEvent::data_changed(key)).await;

        Ok(())
    }

    /// 写入不带命名空间的纯文本值（旧版读取方使用），不触发通知
    pub async fn set_legacy_raw(&self, raw_key: &str, value: &str) -> Result<()> {
        self.db
            .insert(raw_key.as_bytes(), value.as_bytes())
            .map_err(|e| RichacksSDKError::KvStore(format!("写入旧版键失败: {}", e)))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| RichacksSDKError::KvStore(format!("刷盘失败: {}", e)))?;
        Ok(())
    }

    /// 读取不带命名空间的纯文本值
    pub fn get_legacy_raw(&self, raw_key: &str) -> Option<String> {
        self.db
            .get(raw_key.as_bytes())
            .ok()
            .flatten()
            .and_then(|v| String::from_utf8(v.to_vec()).ok())
    }

    /// 直接写入原始字节（测试中模拟损坏数据）
    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: LocalKey, bytes: &[u8]) -> Result<()> {
        let physical = self.physical_key(key);
        self.db.insert(physical.as_bytes(), bytes)?;
        Ok(())
    }
}

/// 打开 sled 数据库；上一个实例可能刚释放文件锁，带退避重试
async fn open_with_retry(kv_path: &Path) -> Result<Db> {
    const MAX_OPEN_RETRIES: u32 = 8;
    const RETRY_DELAY_MS: u64 = 300;

    let mut last_err: Option<sled::Error> = None;
    for attempt in 0..MAX_OPEN_RETRIES {
        match sled::open(kv_path) {
            Ok(db) => return Ok(db),
            Err(e) => {
                let msg = e.to_string();
                last_err = Some(e);
                let is_lock = msg.contains("could not acquire lock")
                    || msg.contains("Resource temporarily unavailable")
                    || msg.contains("WouldBlock");
                if is_lock && attempt + 1 < MAX_OPEN_RETRIES {
                    let delay_ms = RETRY_DELAY_MS * (1 << attempt);
                    warn!("KV 数据库被占用，{}ms 后重试 (attempt {})", delay_ms, attempt + 1);
                    tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                } else {
                    break;
                }
            }
        }
    }

    Err(RichacksSDKError::KvStore(
        last_err
            .map(|e| format!("打开 sled 数据库失败: {}", e))
            .unwrap_or_else(|| "打开 sled 数据库失败".to_string()),
    ))
}
