//! Richacks SDK - 创作者仪表盘的本地优先数据访问层
//!
//! 本 SDK 提供：
//! - 🌐 远程网关：PostgREST（Supabase）表接口，失败时不抛错
//! - 💾 本地存储：sled KV，键带版本命名空间，损坏数据按缺失处理
//! - 🔔 变更通知：本地写入后广播，订阅方重新读取
//! - 🔁 同步门面：帖子、分类、社区消息、变现配置、订阅数的读写回退策略
//! - 🧠 内容生成边界：SEO、脚本、缩略图等外部生成服务的接口和兜底值
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use richacks_sdk::{RichacksConfig, RichacksSDK, RemoteConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RichacksConfig::builder()
//!         .data_dir("/path/to/data")
//!         .remote_config(RemoteConfig::from_env())
//!         .build();
//!
//!     let sdk = RichacksSDK::initialize(config).await?;
//!
//!     // 远端不可用时自动读本地
//!     let posts = sdk.list_posts().await;
//!     println!("{} posts", posts.len());
//!
//!     let category = sdk.add_category("Xbox Series X").await;
//!     assert_eq!(category.slug, "xbox-series-x");
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod http_client;
pub mod sdk;
pub mod storage;
pub mod utils;
pub mod version;

pub use config::{
    EventConfig, HttpClientConfig, RemoteConfig, RichacksConfig, RichacksConfigBuilder,
    StorageConfig,
};
pub use content::{ContentError, ContentGenerator, ContentService};
pub use error::{RemoteError, RemoteResult, Result, RichacksSDKError};
pub use events::{EventManager, EventStats, SDKEvent};
pub use http_client::{resources, CommunityMessageRow, RemoteGateway, RemoteMethod, RestGateway};
pub use sdk::RichacksSDK;
pub use storage::{
    AdNetwork, Category, CommunityMessage, DashboardConfig, KvStore, LocalKey, MessageType,
    MonetizationConfig, Post,
};
pub use utils::{TimeFormatter, TimezoneConfig};
pub use version::SDK_VERSION;
