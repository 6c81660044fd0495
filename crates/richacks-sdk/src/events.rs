//! 事件系统模块 - 本地数据变更通知
//!
//! 每次本地存储写入后广播一个 `DataChanged` 事件。事件只说明"哪个集合变了"，
//! 不携带数据差异；订阅方（UI 等）收到后应通过 `RichacksSDK` 重新读取。
//!
//! 两种订阅方式：
//! - `subscribe()`：tokio broadcast 接收器，适合异步任务
//! - `add_listener()`：同步回调，在 `emit` 内部直接调用

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::storage::LocalKey;
use crate::utils::TimeFormatter;

/// SDK 事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SDKEvent {
    /// 本地数据已变更
    DataChanged {
        key: LocalKey,
        timestamp: i64,
    },
}

impl SDKEvent {
    /// 创建数据变更事件（时间戳取当前时间）
    pub fn data_changed(key: LocalKey) -> Self {
        SDKEvent::DataChanged {
            key,
            timestamp: TimeFormatter::now_utc_millis(),
        }
    }

    /// 获取事件类型字符串
    pub fn event_type(&self) -> &'static str {
        match self {
            SDKEvent::DataChanged { .. } => "data_changed",
        }
    }

    pub fn key(&self) -> LocalKey {
        match self {
            SDKEvent::DataChanged { key, .. } => *key,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            SDKEvent::DataChanged { timestamp, .. } => *timestamp,
        }
    }
}

/// 事件监听器类型
pub type EventListener = Box<dyn Fn(&SDKEvent) + Send + Sync>;

/// 事件管理器
pub struct EventManager {
    /// 广播发送器
    sender: broadcast::Sender<SDKEvent>,
    /// 同步监听器
    listeners: Arc<RwLock<Vec<EventListener>>>,
    /// 事件统计
    stats: Arc<RwLock<EventStats>>,
}

/// 事件统计信息
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    /// 总事件数
    pub total_events: u64,
    /// 按集合分组的事件数
    pub events_by_key: HashMap<LocalKey, u64>,
    /// 监听器数量
    pub listener_count: usize,
    /// 最后事件时间
    pub last_event_time: Option<i64>,
}

impl EventManager {
    /// 创建新的事件管理器
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self {
            sender,
            listeners: Arc::new(RwLock::new(Vec::new())),
            stats: Arc::new(RwLock::new(EventStats::default())),
        }
    }

    /// 发布事件
    ///
    /// 返回前所有同步监听器都已被调用。
    pub async fn emit(&self, event: SDKEvent) {
        debug!("Emitting event: {} ({:?})", event.event_type(), event.key());

        {
            let mut stats = self.stats.write().await;
            stats.total_events += 1;
            *stats.events_by_key.entry(event.key()).or_insert(0) += 1;
            stats.last_event_time = Some(event.timestamp());
        }

        // 无订阅者时 send 会失败，属正常场景（无 UI 的调用方），仅打 debug
        if let Err(e) = self.sender.send(event.clone()) {
            debug!("Failed to broadcast event (no active receivers): {}", e);
        }

        let listeners = self.listeners.read().await;
        for listener in listeners.iter() {
            listener(&event);
        }
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<SDKEvent> {
        self.sender.subscribe()
    }

    /// 添加同步监听器
    pub async fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&SDKEvent) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.write().await;
        listeners.push(Box::new(listener));

        let mut stats = self.stats.write().await;
        stats.listener_count = listeners.len();

        info!("Added data change listener (total: {})", listeners.len());
    }

    /// 移除所有监听器
    pub async fn clear_listeners(&self) {
        let mut listeners = self.listeners.write().await;
        listeners.clear();

        let mut stats = self.stats.write().await;
        stats.listener_count = 0;
    }

    /// 获取事件统计
    pub async fn get_stats(&self) -> EventStats {
        self.stats.read().await.clone()
    }

    /// 获取活跃订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new(100)
    }
}
