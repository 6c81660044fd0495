//! 统一 SDK 接口 - RichacksSDK 主入口
//!
//! 分层架构设计：
//! ```text
//! RichacksSDK (同步门面层)
//!   ├── RemoteGateway (远程网关层，默认 RestGateway)
//!   ├── KvStore (本地存储层)
//!   └── EventManager (变更通知层)
//! ```
//!
//! 读写策略：
//! - 列表：先读远端，成功即原样返回（不回写本地）；否则读本地，本地缺失时用默认值
//! - 保存：先写远端，返回写入的行才算成功，此时不动本地；否则写本地（远端与本地二选一）
//! - 删除：远端删除结果不检查，本地副本总是同步过滤
//! - 配置：只读写本地
//!
//! 所有公开操作都不会失败，调用方只会看到空集合或默认值。

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::RichacksConfig;
use crate::error::{RemoteError, Result};
use crate::events::{EventManager, SDKEvent};
use crate::http_client::{resources, CommunityMessageRow, RemoteGateway, RemoteMethod, RestGateway};
use crate::storage::{
    default_categories, Category, CommunityMessage, DashboardConfig, Identified, KvStore,
    LocalKey, MonetizationConfig, Post,
};
use crate::utils::TimeFormatter;

/// 本地新增记录的插入位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// 插到最前（帖子、消息：按时间倒序）
    Front,
    /// 追加到末尾（分类：按插入顺序）
    Back,
}

/// Richacks 数据访问门面
pub struct RichacksSDK {
    config: RichacksConfig,
    gateway: Arc<dyn RemoteGateway>,
    kv: Arc<KvStore>,
    event_manager: Arc<EventManager>,
    time_formatter: TimeFormatter,
    /// 每个集合一把写锁，串行化"读-改-写"
    write_locks: Arc<Mutex<HashMap<LocalKey, Arc<Mutex<()>>>>>,
}

impl RichacksSDK {
    /// 按配置创建 SDK：打开本地数据库并创建 REST 网关
    ///
    /// 唯一会返回错误的入口（本地数据库无法打开时）。
    pub async fn initialize(config: RichacksConfig) -> Result<Self> {
        info!("🚀 初始化 RichacksSDK (data_dir: {})", config.storage.data_dir.display());

        let event_manager = Arc::new(EventManager::new(config.event_config.buffer_size));
        let kv = Arc::new(KvStore::open(&config.storage, event_manager.clone()).await?);
        let gateway: Arc<dyn RemoteGateway> =
            Arc::new(RestGateway::new(&config.remote, &config.http_client_config)?);

        Ok(Self::from_parts(gateway, kv, config))
    }

    /// 由现成组件组装 SDK（注入自定义网关）
    ///
    /// 变更通知使用 `kv` 自带的事件管理器。
    pub fn from_parts(gateway: Arc<dyn RemoteGateway>, kv: Arc<KvStore>, config: RichacksConfig) -> Self {
        let event_manager = kv.event_manager().clone();
        let time_formatter = TimeFormatter::new(config.timezone());

        Self {
            config,
            gateway,
            kv,
            event_manager,
            time_formatter,
            write_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RichacksConfig {
        &self.config
    }

    pub fn kv(&self) -> &Arc<KvStore> {
        &self.kv
    }

    /// 变更通知管理器
    pub fn events(&self) -> &Arc<EventManager> {
        &self.event_manager
    }

    /// 订阅本地数据变更
    pub fn subscribe(&self) -> broadcast::Receiver<SDKEvent> {
        self.event_manager.subscribe()
    }

    // ========== 帖子 ==========

    pub async fn list_posts(&self) -> Vec<Post> {
        if let Some(posts) = self.fetch_remote_list::<Post>(&resources::list_posts()).await {
            return posts;
        }
        self.kv.get_or(LocalKey::Posts, Vec::new()).await
    }

    /// 保存帖子；本地新增时打上 `createdAt`
    pub async fn save_post(&self, post: Post) {
        if self.remote_insert(resources::POSTS, &post).await {
            return;
        }
        self.upsert_local(LocalKey::Posts, Vec::new(), post, Placement::Front, |p| {
            p.created_at = Some(TimeFormatter::now_utc_millis());
        })
        .await;
    }

    pub async fn delete_post(&self, id: &str) {
        self.remote_delete(resources::POSTS, id).await;
        self.delete_local::<Post>(LocalKey::Posts, Vec::new(), id).await;
    }

    // ========== 分类 ==========

    pub async fn list_categories(&self) -> Vec<Category> {
        if let Some(categories) = self
            .fetch_remote_list::<Category>(&resources::list_categories())
            .await
        {
            return categories;
        }
        self.kv.get_or(LocalKey::Categories, default_categories()).await
    }

    /// 按名称新建分类，ID 取当前毫秒时间戳
    pub async fn add_category(&self, name: &str) -> Category {
        let category = Category::new(TimeFormatter::now_utc_millis().to_string(), name);
        self.save_category(category.clone()).await;
        category
    }

    pub async fn save_category(&self, category: Category) {
        if self.remote_insert(resources::CATEGORIES, &category).await {
            return;
        }
        self.upsert_local(
            LocalKey::Categories,
            default_categories(),
            category,
            Placement::Back,
            |_| {},
        )
        .await;
    }

    pub async fn delete_category(&self, id: &str) {
        self.remote_delete(resources::CATEGORIES, id).await;
        self.delete_local::<Category>(LocalKey::Categories, default_categories(), id)
            .await;
    }

    // ========== 社区消息 ==========

    pub async fn list_messages(&self) -> Vec<CommunityMessage> {
        if let Some(rows) = self
            .fetch_remote_list::<CommunityMessageRow>(&resources::list_messages())
            .await
        {
            return rows
                .into_iter()
                .map(|row| row.into_local(&self.time_formatter))
                .collect();
        }
        self.kv.get_or(LocalKey::Messages, Vec::new()).await
    }

    /// 保存消息；远端使用下划线字段，本地新增时打上 `timestamp`
    pub async fn save_message(&self, message: CommunityMessage) {
        let row = CommunityMessageRow::from_local(&message);
        if self.remote_insert(resources::COMMUNITY_MESSAGES, &row).await {
            return;
        }
        self.upsert_local(LocalKey::Messages, Vec::new(), message, Placement::Front, |m| {
            m.timestamp = TimeFormatter::now_utc_millis();
        })
        .await;
    }

    pub async fn delete_message(&self, id: &str) {
        self.remote_delete(resources::COMMUNITY_MESSAGES, id).await;
        self.delete_local::<CommunityMessage>(LocalKey::Messages, Vec::new(), id)
            .await;
    }

    // ========== 配置 ==========

    /// 读取订阅数和变现配置（只读本地）
    pub async fn get_config(&self) -> DashboardConfig {
        let monetization = self
            .kv
            .get_or(LocalKey::Monetization, MonetizationConfig::default())
            .await;
        let subs = self
            .kv
            .get_or(LocalKey::Subs, self.config.default_subscriber_count)
            .await;
        DashboardConfig { subs, monetization }
    }

    /// 保存订阅数和变现配置，并把订阅数镜像到旧版键
    pub async fn save_config(&self, subs: u64, monetization: MonetizationConfig) {
        let subs_lock = self.get_write_lock(LocalKey::Subs).await;
        let _subs_guard = subs_lock.lock().await;
        let monetization_lock = self.get_write_lock(LocalKey::Monetization).await;
        let _monetization_guard = monetization_lock.lock().await;

        if let Err(e) = self.kv.set(LocalKey::Subs, &subs).await {
            error!("❌ 保存订阅数失败: {}", e);
            return;
        }
        if let Err(e) = self.kv.set(LocalKey::Monetization, &monetization).await {
            error!("❌ 保存变现配置失败: {}", e);
            return;
        }
        if let Err(e) = self
            .kv
            .set_legacy_raw(&self.config.storage.legacy_subs_key, &subs.to_string())
            .await
        {
            error!("❌ 写入旧版订阅数键失败: {}", e);
            return;
        }

        info!("✅ 配置已保存: subs={}, network={:?}", subs, monetization.active_network);
    }

    // ========== 内部实现 ==========

    /// 获取集合写锁
    async fn get_write_lock(&self, key: LocalKey) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 远端读取列表；只有数组且能解析时才返回 Some
    async fn fetch_remote_list<T>(&self, resource_path: &str) -> Option<Vec<T>>
    where
        T: DeserializeOwned,
    {
        match self
            .gateway
            .request(resource_path, RemoteMethod::Get, None)
            .await
        {
            Ok(value @ Value::Array(_)) => match serde_json::from_value::<Vec<T>>(value) {
                Ok(items) => {
                    debug!("远端读取成功: {} ({} 条)", resource_path, items.len());
                    Some(items)
                }
                Err(e) => {
                    log_fallback(resource_path, &RemoteError::Decode(e.to_string()));
                    None
                }
            },
            Ok(_) => {
                log_fallback(
                    resource_path,
                    &RemoteError::Decode("response is not an array".to_string()),
                );
                None
            }
            Err(e) => {
                log_fallback(resource_path, &e);
                None
            }
        }
    }

    /// 远端插入；返回是否成功
    ///
    /// 只有非空响应体才算成功（POST 带 `Prefer: return=representation`）。
    async fn remote_insert<T>(&self, table: &str, record: &T) -> bool
    where
        T: Serialize,
    {
        let body = match serde_json::to_value(record) {
            Ok(body) => body,
            Err(e) => {
                warn!("序列化远端请求体失败，改写本地: table={}, error={}", table, e);
                return false;
            }
        };

        match self
            .gateway
            .request(&resources::insert(table), RemoteMethod::Post, Some(&body))
            .await
        {
            Ok(Value::Null) => {
                // 空响应体或 `null`：没有拿到写入的行，按失败处理
                log_fallback(
                    table,
                    &RemoteError::Decode("empty insert response".to_string()),
                );
                false
            }
            Ok(_) => {
                debug!("远端写入成功: {}", table);
                true
            }
            Err(e) => {
                log_fallback(table, &e);
                false
            }
        }
    }

    /// 远端删除，结果只记日志
    async fn remote_delete(&self, table: &str, id: &str) {
        let path = resources::delete_by_id(table, id);
        if let Err(e) = self.gateway.request(&path, RemoteMethod::Delete, None).await {
            debug!("远端删除未成功（忽略）: {}, kind={}", path, e.kind());
        }
    }

    /// 本地新增或替换
    ///
    /// ID 已存在则原位替换（不打时间戳），否则调用 `stamp` 后按 `placement` 插入。
    async fn upsert_local<T, F>(
        &self,
        key: LocalKey,
        default: Vec<T>,
        mut item: T,
        placement: Placement,
        stamp: F,
    ) where
        T: Identified + Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let lock = self.get_write_lock(key).await;
        let _guard = lock.lock().await;

        let mut items: Vec<T> = self.kv.get_or(key, default).await;
        match items.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => items[index] = item,
            None => {
                stamp(&mut item);
                match placement {
                    Placement::Front => items.insert(0, item),
                    Placement::Back => items.push(item),
                }
            }
        }

        if let Err(e) = self.kv.set(key, &items).await {
            error!("❌ 本地保存失败: key={}, error={}", key, e);
        }
    }

    /// 本地过滤掉指定 ID；不存在也照常写回
    async fn delete_local<T>(&self, key: LocalKey, default: Vec<T>, id: &str)
    where
        T: Identified + Serialize + DeserializeOwned,
    {
        let lock = self.get_write_lock(key).await;
        let _guard = lock.lock().await;

        let mut items: Vec<T> = self.kv.get_or(key, default).await;
        items.retain(|item| item.id() != id);

        if let Err(e) = self.kv.set(key, &items).await {
            error!("❌ 本地删除失败: key={}, id={}, error={}", key, id, e);
        }
    }
}

fn log_fallback(resource: &str, err: &RemoteError) {
    warn!("远端不可用，回退本地: {}, kind={}, error={}", resource, err.kind(), err);
}
