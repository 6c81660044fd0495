//! SDK 配置
//!
//! 所有配置在构造 `RichacksSDK` 时一次性传入，运行期不再读取环境变量。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::TimezoneConfig;
use crate::version::{KEY_PREFIX, LEGACY_SUBS_KEY, SCHEMA_VERSION};

/// 远程数据端点配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 基础 URL，例如 https://xxxx.supabase.co
    pub base_url: String,
    /// 访问凭证；为空时所有远程调用直接走本地回退
    pub api_key: Option<String>,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// 从环境变量读取（SUPABASE_URL / SUPABASE_KEY），只在构造时调用
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("SUPABASE_URL").unwrap_or_default(),
            std::env::var("SUPABASE_KEY").ok(),
        )
    }

    /// 是否配置了可用的访问凭证
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// HTTP 客户端配置
///
/// 默认不设超时：请求挂起时只会推迟回退。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// 连接超时（秒）
    pub connect_timeout_secs: Option<u64>,
    /// 请求超时（秒）
    pub request_timeout_secs: Option<u64>,
}

/// 本地存储配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 数据存储目录，KV 数据库位于 {data_dir}/kv
    pub data_dir: PathBuf,
    /// 键前缀
    pub key_prefix: String,
    /// 数据布局版本标签
    pub schema_version: String,
    /// 旧版订阅数镜像键
    pub legacy_subs_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: get_default_data_dir(),
            key_prefix: KEY_PREFIX.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            legacy_subs_key: LEGACY_SUBS_KEY.to_string(),
        }
    }
}

/// 事件配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// 事件缓冲区大小
    pub buffer_size: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self { buffer_size: 100 }
    }
}

/// Richacks SDK 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichacksConfig {
    pub remote: RemoteConfig,
    pub http_client_config: HttpClientConfig,
    pub storage: StorageConfig,
    pub event_config: EventConfig,
    /// 本地没有订阅数时的基线值
    pub default_subscriber_count: u64,
    /// 时区偏移秒数；None 表示使用系统本地时区
    pub timezone_offset_seconds: Option<i32>,
}

impl RichacksConfig {
    pub fn builder() -> RichacksConfigBuilder {
        RichacksConfigBuilder::new()
    }

    pub fn timezone(&self) -> TimezoneConfig {
        match self.timezone_offset_seconds {
            Some(offset_seconds) => TimezoneConfig { offset_seconds },
            None => TimezoneConfig::local(),
        }
    }
}

impl Default for RichacksConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            http_client_config: HttpClientConfig::default(),
            storage: StorageConfig::default(),
            event_config: EventConfig::default(),
            default_subscriber_count: 28,
            timezone_offset_seconds: None,
        }
    }
}

/// 获取默认数据目录 ~/.richacks/
fn get_default_data_dir() -> PathBuf {
    if let Some(home_dir) = std::env::var("HOME").ok().map(PathBuf::from) {
        home_dir.join(".richacks")
    } else if let Some(home_dir) = std::env::var("USERPROFILE").ok().map(PathBuf::from) {
        home_dir.join(".richacks")
    } else {
        PathBuf::from("./richacks_data")
    }
}

/// 配置构建器
#[derive(Debug, Default)]
pub struct RichacksConfigBuilder {
    config: RichacksConfig,
}

impl RichacksConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// 设置远程端点；空凭证视为未配置
    pub fn remote<S: Into<String>>(mut self, base_url: S, api_key: Option<String>) -> Self {
        self.config.remote = RemoteConfig::new(base_url, api_key);
        self
    }

    pub fn remote_config(mut self, remote: RemoteConfig) -> Self {
        self.config.remote = remote;
        self
    }

    pub fn http_client_config(mut self, http: HttpClientConfig) -> Self {
        self.config.http_client_config = http;
        self
    }

    pub fn key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.storage.key_prefix = prefix.into();
        self
    }

    pub fn schema_version<S: Into<String>>(mut self, version: S) -> Self {
        self.config.storage.schema_version = version.into();
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_config.buffer_size = size;
        self
    }

    pub fn default_subscriber_count(mut self, subs: u64) -> Self {
        self.config.default_subscriber_count = subs;
        self
    }

    pub fn timezone(mut self, tz: TimezoneConfig) -> Self {
        self.config.timezone_offset_seconds = Some(tz.offset_seconds);
        self
    }

    pub fn build(self) -> RichacksConfig {
        self.config
    }
}
