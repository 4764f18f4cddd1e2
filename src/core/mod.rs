// Core module - shared types, errors and scraping building blocks
// 核心模块：平台类型、统一评论结构、错误定义

mod scrape_progress;
pub use scrape_progress::{ChannelSink, CommentEmitter, CommentEvent, CommentSink, NoopSink, TracingSink};

pub mod config;
pub mod http;
pub mod pagination;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Platform type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// 图片/视频帖子平台（shortcode 寻址）
    Instagram,
    /// 短视频平台（数字 aweme id 寻址）
    TikTok,
}

impl PlatformType {
    /// Get platform display name
    pub fn display_name(&self) -> String {
        match self {
            PlatformType::Instagram => "Instagram",
            PlatformType::TikTok => "TikTok",
        }.to_string()
    }

    /// 平台标签（日志与序列化使用）
    pub fn as_tag(&self) -> &'static str {
        match self {
            PlatformType::Instagram => "instagram",
            PlatformType::TikTok => "tiktok",
        }
    }

    /// Get platform type from a tag string
    ///
    /// 同时接受平台名与通用标签（photo-platform / video-platform）
    pub fn from_tag(tag: &str) -> Option<PlatformType> {
        match tag.trim().to_lowercase().as_str() {
            "instagram" | "ig" | "photo-platform" => Some(PlatformType::Instagram),
            "tiktok" | "tt" | "video-platform" => Some(PlatformType::TikTok),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// 评论时间
///
/// 保留平台原始值，不做任何时间格式转换：
/// TikTok 为整数时间戳，其他来源可能是字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedAt {
    Epoch(i64),
    Text(String),
}

impl Default for CreatedAt {
    fn default() -> Self {
        CreatedAt::Text(String::new())
    }
}

impl CreatedAt {
    /// 从原始JSON节点读取，缺失或null时返回空字符串
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(ts) => CreatedAt::Epoch(ts),
                None => CreatedAt::Text(n.to_string()),
            },
            Value::String(s) => CreatedAt::Text(s.clone()),
            _ => CreatedAt::default(),
        }
    }
}

impl std::fmt::Display for CreatedAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreatedAt::Epoch(ts) => write!(f, "{}", ts),
            CreatedAt::Text(s) => f.write_str(s),
        }
    }
}

/// 统一评论记录（与平台无关）
///
/// 四个字段始终存在，缺失时为空字符串，创建后不再修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// 帖子ID（shortcode 或 aweme id）
    pub post_id: String,
    /// 评论用户名
    pub username: String,
    /// 评论时间（平台原始值）
    pub created_at: CreatedAt,
    /// 评论内容
    pub comment_text: String,
}

impl Comment {
    pub fn new(
        post_id: impl Into<String>,
        username: impl Into<String>,
        created_at: CreatedAt,
        comment_text: impl Into<String>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            username: username.into(),
            created_at,
            comment_text: comment_text.into(),
        }
    }

    /// 从扁平JSON记录归一化
    ///
    /// 对已经归一化的记录再次调用时字段保持不变
    pub fn from_record(record: &Value) -> Self {
        Self {
            post_id: string_field(record, "post_id"),
            username: string_field(record, "username"),
            created_at: CreatedAt::from_value(&record["created_at"]),
            comment_text: string_field(record, "comment_text"),
        }
    }
}

/// 读取字符串字段，缺失或非字符串时返回空字符串
pub(crate) fn string_field(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Scrape errors
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing container: {0}")]
    MissingContainer(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ScrapeError {
    /// 网络/HTTP 层错误
    pub fn is_transport(&self) -> bool {
        matches!(self, ScrapeError::NetworkError(_) | ScrapeError::HttpStatus { .. })
    }

    /// 响应结构不符合预期
    pub fn is_parse(&self) -> bool {
        matches!(self, ScrapeError::ParseError(_) | ScrapeError::MissingContainer(_))
    }
}

impl std::convert::From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if e.is_decode() => ScrapeError::ParseError(e.to_string()),
            None => ScrapeError::NetworkError(e.to_string()),
        }
    }
}

impl std::convert::From<serde_json::Error> for ScrapeError {
    fn from(e: serde_json::Error) -> Self {
        ScrapeError::ParseError(e.to_string())
    }
}
