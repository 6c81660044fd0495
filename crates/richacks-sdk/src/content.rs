//! 内容生成协作边界
//!
//! 仪表盘的 SEO、脚本、缩略图、选题、趋势和资源搜索都由外部生成服务完成。
//! 本模块只定义记录类型和 `ContentGenerator` 接口，具体实现由宿主注入。
//! `ContentService` 包装生成器，失败时返回固定的兜底值，调用方无需处理错误。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

pub const SEO_ERROR_TITLE: &str = "Error de Generación";
pub const SEO_ERROR_TAGS: [&str; 2] = ["ia", "error"];
pub const SEO_ERROR_DESCRIPTION: &str = "No se pudo conectar con el motor SEO.";
pub const SCRIPT_ERROR: &str = "Error técnico en la central Richacks.";
pub const SCRIPT_EMPTY: &str = "Error al procesar el guion.";
pub const TRENDS_ERROR: &str = "ERROR_TRENDS";
pub const RESOURCES_ERROR: &str = "ERROR_AI";
pub const RESOURCES_ERROR_ANALYSIS: &str = "Error de conexión con la red de búsqueda.";

/// 生成服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("content generator credential not configured")]
    MissingApiKey,

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("malformed generator output: {0}")]
    Decode(String),
}

/// SEO 优化结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoOutput {
    pub titles: Vec<String>,
    /// 有序且不重复
    pub tags: Vec<String>,
    pub description: String,
}

impl SeoOutput {
    pub fn new(titles: Vec<String>, tags: Vec<String>, description: impl Into<String>) -> Self {
        let mut seen = HashSet::new();
        let tags = tags
            .into_iter()
            .filter(|tag| seen.insert(tag.clone()))
            .collect();
        Self {
            titles,
            tags,
            description: description.into(),
        }
    }

    fn fallback() -> Self {
        Self::new(
            vec![SEO_ERROR_TITLE.to_string()],
            SEO_ERROR_TAGS.iter().map(|t| t.to_string()).collect(),
            SEO_ERROR_DESCRIPTION,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoIdea {
    pub title: String,
    pub concept: String,
    pub potential: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendTopic {
    pub title: String,
    pub source: String,
    pub image_url: String,
    pub hot_score: u32,
}

/// 趋势列表；失败时 `error` 为 `ERROR_TRENDS`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrendsResult {
    pub trends: Vec<TrendTopic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsReport {
    pub title: String,
    pub full_content: String,
    pub video_ideas: Vec<String>,
    pub hooks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceCategory {
    Creator,
    Normal,
    Tools,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResource {
    pub title: String,
    pub description: String,
    pub url: String,
    pub file_types: Vec<String>,
    pub is_direct: bool,
    pub category: ResourceCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub analysis: String,
    pub resources: Vec<SearchResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 外部内容生成服务
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn optimize_seo(&self, topic: &str) -> Result<SeoOutput, ContentError>;

    async fn generate_script(&self, topic: &str) -> Result<String, ContentError>;

    /// 返回 data URL；`base_image` 为可选的参考图（data URL）
    async fn generate_thumbnail(
        &self,
        prompt: &str,
        base_image: Option<&str>,
    ) -> Result<Option<String>, ContentError>;

    async fn generate_viral_ideas(&self, niche: &str) -> Result<Vec<VideoIdea>, ContentError>;

    async fn fetch_trends(&self) -> Result<Vec<TrendTopic>, ContentError>;

    async fn news_detail(&self, title: &str, source: &str) -> Result<NewsReport, ContentError>;

    async fn find_resources(&self, query: &str) -> Result<SearchResult, ContentError>;
}

/// 不会失败的内容服务
pub struct ContentService<G> {
    generator: G,
}

impl<G: ContentGenerator> ContentService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn optimize_seo(&self, topic: &str) -> SeoOutput {
        match self.generator.optimize_seo(topic).await {
            Ok(output) => SeoOutput::new(output.titles, output.tags, output.description),
            Err(e) => {
                warn!("SEO 生成失败: {}", e);
                SeoOutput::fallback()
            }
        }
    }

    pub async fn generate_script(&self, topic: &str) -> String {
        match self.generator.generate_script(topic).await {
            Ok(script) if script.trim().is_empty() => SCRIPT_EMPTY.to_string(),
            Ok(script) => script,
            Err(e) => {
                warn!("脚本生成失败: {}", e);
                SCRIPT_ERROR.to_string()
            }
        }
    }

    pub async fn generate_thumbnail(&self, prompt: &str, base_image: Option<&str>) -> Option<String> {
        match self.generator.generate_thumbnail(prompt, base_image).await {
            Ok(image) => image,
            Err(e) => {
                warn!("缩略图生成失败: {}", e);
                None
            }
        }
    }

    pub async fn generate_viral_ideas(&self, niche: &str) -> Vec<VideoIdea> {
        self.generator
            .generate_viral_ideas(niche)
            .await
            .unwrap_or_else(|e| {
                warn!("选题生成失败: {}", e);
                Vec::new()
            })
    }

    pub async fn fetch_trends(&self) -> TrendsResult {
        match self.generator.fetch_trends().await {
            Ok(trends) => TrendsResult { trends, error: None },
            Err(e) => {
                warn!("趋势获取失败: {}", e);
                TrendsResult {
                    trends: Vec::new(),
                    error: Some(TRENDS_ERROR.to_string()),
                }
            }
        }
    }

    pub async fn news_detail(&self, title: &str, source: &str) -> Option<NewsReport> {
        match self.generator.news_detail(title, source).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("新闻解析失败: {}", e);
                None
            }
        }
    }

    pub async fn find_resources(&self, query: &str) -> SearchResult {
        match self.generator.find_resources(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!("资源搜索失败: {}", e);
                SearchResult {
                    analysis: RESOURCES_ERROR_ANALYSIS.to_string(),
                    resources: Vec::new(),
                    error: Some(RESOURCES_ERROR.to_string()),
                }
            }
        }
    }
}
