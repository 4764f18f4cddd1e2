//! 通用工具
//!
//! 提供链接解析、文本清洗、时间格式化等工具方法
//!
//! # 主要功能
//!
//! - 从帖子链接提取平台ID
//! - 根据链接识别平台
//! - 清洗评论文本（合并空白、去除链接）
//! - 格式化评论时间
//! - 截取预览文本

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::core::{CreatedAt, PlatformType};

/// 预览文本最大字符数
pub const PREVIEW_CHARS: usize = 100;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static INSTAGRAM_POST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"instagram\.com/p/([A-Za-z0-9_-]+)").expect("valid instagram url regex"));

static TIKTOK_VIDEO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tiktok\.com/@[^/]+/video/(\d+)").expect("valid tiktok url regex"));

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// 从帖子链接提取平台ID
///
/// # 参数
///
/// * `url` - 帖子链接
/// * `platform_tag` - 平台标签（`instagram`/`photo-platform`/`ig` 或 `tiktok`/`video-platform`/`tt`）
///
/// # 返回
///
/// Instagram 返回 `/p/` 后的短码，TikTok 返回 `/video/` 后的数字ID；
/// 标签未知或链接不匹配时返回 `None`
pub fn extract_post_id(url: &str, platform_tag: &str) -> Option<String> {
    let re = match PlatformType::from_tag(platform_tag)? {
        PlatformType::Instagram => &*INSTAGRAM_POST_RE,
        PlatformType::TikTok => &*TIKTOK_VIDEO_RE,
    };
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 根据链接域名识别平台
pub fn platform_from_url(url: &str) -> Option<PlatformType> {
    let lower = url.to_lowercase();
    if lower.contains("instagram.com") {
        Some(PlatformType::Instagram)
    } else if lower.contains("tiktok.com") {
        Some(PlatformType::TikTok)
    } else {
        None
    }
}

/// 清洗评论文本
///
/// 合并连续空白并去除 http(s) 链接，结果首尾无空白
pub fn clean_text(text: &str) -> String {
    let without_urls = URL_RE.replace_all(text, " ");
    WHITESPACE_RE.replace_all(without_urls.trim(), " ").into_owned()
}

/// 格式化评论时间
///
/// 整数时间戳按 UTC 输出 `YYYY-MM-DD HH:MM:SS`；
/// 文本若为 ISO-8601 则重新格式化，否则原样返回
pub fn format_timestamp(created_at: &CreatedAt) -> String {
    match created_at {
        CreatedAt::Epoch(secs) => DateTime::<Utc>::from_timestamp(*secs, 0)
            .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
            .unwrap_or_else(|| secs.to_string()),
        CreatedAt::Text(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return dt.format(DISPLAY_FORMAT).to_string();
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
                return dt.format(DISPLAY_FORMAT).to_string();
            }
            text.clone()
        }
    }
}

/// 截取预览文本
///
/// 超过 [`PREVIEW_CHARS`] 个字符时截断并追加 `...`（按字符截取，不会截断中文或Emoji）
pub fn preview_text(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
