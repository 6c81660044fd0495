//! HTTP 客户端模块 - 远程数据网关
//!
//! 本模块封装 PostgREST 风格（Supabase）的表接口访问，使用 reqwest 作为底层
//! HTTP 客户端。所有失败都以 `RemoteError` 返回，由 `RichacksSDK` 决定是否回退。

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{HttpClientConfig, RemoteConfig};
use crate::error::{RemoteError, RemoteResult, Result, RichacksSDKError};
use crate::storage::entities::null_as_default;
use crate::storage::{CommunityMessage, MessageType};
use crate::utils::TimeFormatter;

/// 远程请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMethod {
    Get,
    Post,
    Delete,
}

impl RemoteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteMethod::Get => "GET",
            RemoteMethod::Post => "POST",
            RemoteMethod::Delete => "DELETE",
        }
    }
}

/// 远程网关
///
/// `resource_path` 是表名加查询串（见 [`resources`]），不含 `/rest/v1/` 前缀。
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn request(
        &self,
        resource_path: &str,
        method: RemoteMethod,
        body: Option<&Value>,
    ) -> RemoteResult<Value>;
}

/// 表资源路径
pub mod resources {
    pub const POSTS: &str = "posts";
    pub const CATEGORIES: &str = "categories";
    pub const COMMUNITY_MESSAGES: &str = "community_messages";

    pub fn list_posts() -> String {
        format!("{}?select=*&order=created_at.desc", POSTS)
    }

    pub fn list_categories() -> String {
        format!("{}?select=*", CATEGORIES)
    }

    pub fn list_messages() -> String {
        format!("{}?select=*&order=created_at.desc", COMMUNITY_MESSAGES)
    }

    /// 插入路径即表名
    pub fn insert(table: &str) -> String {
        table.to_string()
    }

    /// 按 ID 删除，ID 原样拼接
    pub fn delete_by_id(table: &str, id: &str) -> String {
        format!("{}?id=eq.{}", table, id)
    }
}

/// 基于 reqwest 的 REST 网关
pub struct RestGateway {
    client: Client,
    remote: RemoteConfig,
}

impl RestGateway {
    /// 创建网关；凭证缺失不算错误，请求时直接返回 `CredentialMissing`
    pub fn new(remote: &RemoteConfig, http: &HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(timeout) = http.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(timeout));
        }

        if let Some(timeout) = http.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| RichacksSDKError::Other(format!("创建 HTTP 客户端失败: {}", e)))?;

        if remote.has_credential() {
            info!("✅ 远程网关已创建 (base_url: {})", remote.base_url);
        } else {
            info!("远程网关未配置凭证，所有读写走本地存储");
        }

        Ok(Self {
            client,
            remote: remote.clone(),
        })
    }

    /// 完整请求 URL
    pub fn endpoint(&self, resource_path: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.remote.base_url.trim_end_matches('/'),
            resource_path
        )
    }
}

#[async_trait]
impl RemoteGateway for RestGateway {
    async fn request(
        &self,
        resource_path: &str,
        method: RemoteMethod,
        body: Option<&Value>,
    ) -> RemoteResult<Value> {
        let api_key = match self.remote.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(RemoteError::CredentialMissing),
        };

        let url = self.endpoint(resource_path);
        debug!("🌐 {} {}", method.as_str(), url);

        let mut builder = match method {
            RemoteMethod::Get => self.client.get(&url),
            RemoteMethod::Post => self.client.post(&url),
            RemoteMethod::Delete => self.client.delete(&url),
        };

        builder = builder
            .header("apikey", api_key)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json");

        if method == RemoteMethod::Post {
            builder = builder.header("Prefer", "return=representation");
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("读取响应体失败: {}", e)))?;

        if !status.is_success() {
            warn!("❌ 远程请求失败: {} {} -> {}", method.as_str(), resource_path, status);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// 社区消息的远端行形状
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityMessageRow {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// 远端写入时间，出站时不发送
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
}

impl CommunityMessageRow {
    /// 本地消息 -> 出站行（日期和时间戳由远端 `created_at` 代替）
    pub fn from_local(msg: &CommunityMessage) -> Self {
        Self {
            id: msg.id.clone(),
            user_name: msg.user.clone(),
            message_type: msg.message_type,
            message: msg.message.clone(),
            audio_url: msg.audio_url.clone(),
            image_url: msg.image_url.clone(),
            created_at: None,
        }
    }

    /// 入站行 -> 本地消息；`created_at` 缺失或无法解析时时间戳为 0、日期为空
    pub fn into_local(self, formatter: &TimeFormatter) -> CommunityMessage {
        let timestamp = self
            .created_at
            .as_deref()
            .and_then(TimeFormatter::parse_remote_timestamp);

        let (date, timestamp) = match timestamp {
            Some(ms) => (formatter.format_standard(ms), ms),
            None => (String::new(), 0),
        };

        CommunityMessage {
            id: self.id,
            user: self.user_name,
            message_type: self.message_type,
            message: self.message,
            audio_url: self.audio_url,
            image_url: self.image_url,
            date,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TimezoneConfig;
    use serde_json::json;

    #[test]
    fn test_resource_paths() {
        assert_eq!(resources::list_posts(), "posts?select=*&order=created_at.desc");
        assert_eq!(resources::list_categories(), "categories?select=*");
        assert_eq!(
            resources::list_messages(),
            "community_messages?select=*&order=created_at.desc"
        );
        assert_eq!(resources::insert(resources::POSTS), "posts");
        assert_eq!(
            resources::delete_by_id(resources::CATEGORIES, "1705500000000"),
            "categories?id=eq.1705500000000"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = RestGateway::new(
            &RemoteConfig::new("https://demo.supabase.co/", Some("k".into())),
            &HttpClientConfig::default(),
        )
        .unwrap();
        assert_eq!(
            gateway.endpoint("posts"),
            "https://demo.supabase.co/rest/v1/posts"
        );
    }

    #[tokio::test]
    async fn test_no_credential_short_circuits() {
        // 不可达地址：若真的发起请求会得到 Transport 而不是 CredentialMissing
        let gateway = RestGateway::new(
            &RemoteConfig::new("http://127.0.0.1:1", None),
            &HttpClientConfig::default(),
        )
        .unwrap();

        let result = gateway
            .request(&resources::list_posts(), RemoteMethod::Get, None)
            .await;
        assert_eq!(result, Err(RemoteError::CredentialMissing));
    }

    #[test]
    fn test_message_row_outbound_shape() {
        let msg = CommunityMessage {
            id: "m1".into(),
            user: "ana".into(),
            message_type: MessageType::Request,
            message: "tutorial de mods".into(),
            audio_url: None,
            image_url: Some("https://cdn/x.png".into()),
            date: "hoy".into(),
            timestamp: 123,
        };

        let value = serde_json::to_value(CommunityMessageRow::from_local(&msg)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "m1",
                "user_name": "ana",
                "type": "REQUEST",
                "message": "tutorial de mods",
                "audio_url": null,
                "image_url": "https://cdn/x.png"
            })
        );
    }

    #[test]
    fn test_message_row_inbound() {
        let formatter = TimeFormatter::new(TimezoneConfig::utc());
        let row: CommunityMessageRow = serde_json::from_value(json!({
            "id": "m2",
            "user_name": "leo",
            "type": "ERROR",
            "message": "link roto",
            "audio_url": null,
            "image_url": null,
            "created_at": "2024-01-17T14:30:45.123+00:00"
        }))
        .unwrap();

        let local = row.into_local(&formatter);
        assert_eq!(local.user, "leo");
        assert_eq!(local.message_type, MessageType::Error);
        assert_eq!(local.timestamp, 1_705_501_845_123);
        assert_eq!(local.date, "2024-01-17 14:30:45");
    }

    #[test]
    fn test_message_row_nullable_text() {
        let formatter = TimeFormatter::new(TimezoneConfig::utc());
        let row: CommunityMessageRow = serde_json::from_value(json!({
            "id": "m4",
            "user_name": null,
            "type": "REQUEST",
            "message": null,
            "created_at": "2024-01-17T14:30:45+00:00"
        }))
        .unwrap();

        let local = row.into_local(&formatter);
        assert_eq!(local.user, "");
        assert_eq!(local.message, "");
        assert_eq!(local.timestamp, 1_705_501_845_000);
    }

    #[test]
    fn test_message_row_without_created_at() {
        let formatter = TimeFormatter::new(TimezoneConfig::utc());
        let row: CommunityMessageRow = serde_json::from_value(json!({
            "id": "m3",
            "user_name": "x",
            "type": "COLAB",
            "message": "hola",
            "created_at": "not a date"
        }))
        .unwrap();

        let local = row.into_local(&formatter);
        assert_eq!(local.timestamp, 0);
        assert_eq!(local.date, "");
    }
}
