//! 数据实体定义
//!
//! JSON 字段名与前端/远端保持一致（camelCase），本地存储和远程读写共用同一形状；
//! 只有社区消息的远端行形状不同，转换放在 `http_client` 中。

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// 远端可空列：`null` 按默认值处理
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 内容帖子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// 分类 ID
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_image: Option<String>,
    /// 展示日期（由调用方给出的可读字符串）
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// 首次写入本地时打的毫秒时间戳；远端读取时为空（远端自己记 created_at）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// 分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

impl Category {
    /// 根据名称创建分类，slug 自动派生
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: id.into(),
            name,
            slug,
        }
    }
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// slug 规则：转小写，连续空白替换为单个 `-`
pub fn slugify(name: &str) -> String {
    whitespace_runs()
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// 本地没有任何分类时使用的初始分类
pub fn default_categories() -> Vec<Category> {
    vec![Category::new("1", "PC"), Category::new("2", "Android")]
}

/// 社区消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// 报错
    Error,
    /// 合作
    Colab,
    /// 请求
    Request,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Error => "ERROR",
            MessageType::Colab => "COLAB",
            MessageType::Request => "REQUEST",
        }
    }
}

/// 社区消息（本地形状）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMessage {
    pub id: String,
    /// 用户显示名
    pub user: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 可读日期字符串
    #[serde(default)]
    pub date: String,
    /// 毫秒时间戳，用于排序
    #[serde(default)]
    pub timestamp: i64,
}

/// 变现网络选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdNetwork {
    #[default]
    None,
    Moneytizer,
    Adsterra,
    Ezoic,
    Mixed,
}

/// 变现配置（单例）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetizationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moneytizer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adsterra_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ezoic_id: Option<String>,
    #[serde(default)]
    pub active_network: AdNetwork,
}

/// `get_config` 的返回值：订阅数 + 变现配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub subs: u64,
    pub monetization: MonetizationConfig,
}

/// 带 ID 的集合元素
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for CommunityMessage {
    fn id(&self) -> &str {
        &self.id
    }
}
