// Commands module - CLI command handlers
// 命令模块 - 命令行命令处理

use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use thiserror::Error;
use crate::cli::Command;
use crate::core::config::{ConfigError, ScraperConfig};
use crate::core::{Comment, CommentSink, CreatedAt, PlatformType, ScrapeError, TracingSink};
use crate::platforms::{scrape_url, ScraperFactory};
use crate::utils::{extract_post_id, format_timestamp, platform_from_url};

/// 输入无效时的退出码
pub const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Config(_) => EXIT_INVALID_INPUT,
            CommandError::Scrape(ScrapeError::InvalidInput(_)) => EXIT_INVALID_INPUT,
            _ => 1,
        }
    }
}

// Platform info
// 平台信息
#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub id: &'static str,
    pub name: String,
    pub aliases: &'static [&'static str],
}

pub fn get_supported_platforms() -> Vec<PlatformInfo> {
    ScraperFactory::supported_platforms()
        .into_iter()
        .map(|platform| PlatformInfo {
            id: platform.as_tag(),
            name: platform.display_name(),
            aliases: match platform {
                PlatformType::Instagram => &["ig", "photo-platform"],
                PlatformType::TikTok => &["tt", "video-platform"],
            },
        })
        .collect()
}

/// 确定平台标签：优先使用显式标签，否则按链接识别
pub fn resolve_platform_tag(url: &str, platform: Option<&str>) -> Result<String, ScrapeError> {
    match platform {
        Some(tag) => PlatformType::from_tag(tag)
            .map(|_| tag.to_string())
            .ok_or_else(|| ScrapeError::InvalidInput(format!("不支持的平台: {}", tag))),
        None => platform_from_url(url)
            .map(|p| p.as_tag().to_string())
            .ok_or_else(|| ScrapeError::InvalidInput(format!("无法从链接识别平台: {}", url))),
    }
}

// Extract post id
// 提取帖子ID
pub fn extract_id(url: &str, platform: Option<&str>) -> Result<String, CommandError> {
    let tag = resolve_platform_tag(url, platform)?;
    extract_post_id(url, &tag)
        .ok_or_else(|| ScrapeError::InvalidInput(format!("无法从链接提取帖子ID: {}", url)).into())
}

/// 应用命令行覆盖项
pub fn apply_overrides(
    config: ScraperConfig,
    page_size: Option<u32>,
    delay_secs: Option<u64>,
) -> Result<ScraperConfig, ConfigError> {
    let config = match page_size {
        Some(size) => config.with_page_size(size)?,
        None => config,
    };
    Ok(match delay_secs {
        Some(secs) => config.with_page_delay(Duration::from_secs(secs)),
        None => config,
    })
}

// Scrape comments
// 抓取评论
pub fn scrape(
    url: &str,
    platform: Option<&str>,
    config: &ScraperConfig,
    sink: Arc<dyn CommentSink>,
) -> Result<Vec<Comment>, CommandError> {
    let tag = resolve_platform_tag(url, platform)?;
    let comments = scrape_url(url, &tag, config, sink)?;
    tracing::info!("[CLI] 共抓取 {} 条评论", comments.len());
    Ok(comments)
}

/// 将评论时间转换为可读格式
pub fn with_readable_time(comments: Vec<Comment>) -> Vec<Comment> {
    comments
        .into_iter()
        .map(|mut c| {
            c.created_at = CreatedAt::Text(format_timestamp(&c.created_at));
            c
        })
        .collect()
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CommandError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// 执行命令，返回要输出到标准输出的内容
pub fn execute(command: Command) -> Result<String, CommandError> {
    match command {
        Command::Scrape { url, platform, page_size, delay_secs, pretty, readable_time } => {
            let config = apply_overrides(ScraperConfig::from_env()?, page_size, delay_secs)?;
            let mut comments = scrape(&url, platform.as_deref(), &config, Arc::new(TracingSink))?;
            if readable_time {
                comments = with_readable_time(comments);
            }
            to_json(&comments, pretty)
        }
        Command::ExtractId { url, platform } => extract_id(&url, platform.as_deref()),
        Command::Platforms => to_json(&get_supported_platforms(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NoopSink;

    #[test]
    fn test_resolve_platform_tag() {
        assert_eq!(
            resolve_platform_tag("https://www.tiktok.com/@u/video/1", None).unwrap(),
            "tiktok"
        );
        assert_eq!(
            resolve_platform_tag("https://example.com", Some("photo-platform")).unwrap(),
            "photo-platform"
        );
        assert!(matches!(
            resolve_platform_tag("https://example.com", None),
            Err(ScrapeError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_platform_tag("https://www.tiktok.com/@u/video/1", Some("vine")),
            Err(ScrapeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(
            extract_id("https://www.instagram.com/p/DNcgnWvRJ9-/", None).unwrap(),
            "DNcgnWvRJ9-"
        );
        let err = extract_id("https://www.instagram.com/explore/", None).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    }

    #[test]
    fn test_scrape_rejects_before_network() {
        let config = ScraperConfig::default();
        let err = scrape("https://example.com/x", None, &config, Arc::new(NoopSink)).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    }

    #[test]
    fn test_apply_overrides() {
        let config = apply_overrides(ScraperConfig::default(), Some(20), Some(0)).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.page_delay, Duration::ZERO);

        let err = apply_overrides(ScraperConfig::default(), Some(500), None).unwrap_err();
        assert_eq!(CommandError::from(err).exit_code(), EXIT_INVALID_INPUT);
    }

    #[test]
    fn test_supported_platforms() {
        let platforms = get_supported_platforms();
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].id, "instagram");
        assert_eq!(platforms[1].id, "tiktok");
    }

    #[test]
    fn test_with_readable_time() {
        let comments = vec![
            Comment::new("1", "u", CreatedAt::Epoch(0), "a"),
            Comment::new("1", "u", CreatedAt::Text("kemarin".into()), "b"),
        ];
        let converted = with_readable_time(comments);
        assert_eq!(converted[0].created_at, CreatedAt::Text("1970-01-01 00:00:00".into()));
        assert_eq!(converted[1].created_at, CreatedAt::Text("kemarin".into()));
    }

    #[test]
    fn test_network_error_exit_code() {
        let err = CommandError::from(ScrapeError::NetworkError("timeout".into()));
        assert_eq!(err.exit_code(), 1);
    }
}
