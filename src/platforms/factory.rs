//! 评论抓取器工厂
//!
//! 按平台类型创建对应的抓取器实例，每次创建都是独立实例（各自持有HTTP客户端）
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use social_comment_scraper::core::{PlatformType, TracingSink};
//! use social_comment_scraper::core::config::ScraperConfig;
//! use social_comment_scraper::platforms::ScraperFactory;
//!
//! let config = ScraperConfig::from_env().unwrap();
//! let scraper = ScraperFactory::create(PlatformType::TikTok, &config, Arc::new(TracingSink)).unwrap();
//! let comments = scraper.scrape_comments("7539605848159489286");
//! ```

use std::sync::Arc;
use crate::core::config::ScraperConfig;
use crate::core::http::{BlockingHttp, JsonFetcher};
use crate::core::pagination::RateGovernor;
use crate::core::{Comment, CommentSink, PlatformType, ScrapeError};
use crate::platforms::instagram::InstagramScraper;
use crate::platforms::tiktok::TikTokScraper;
use crate::platforms::traits::CommentScraper;
use crate::utils::extract_post_id;

/// 评论抓取器工厂
pub struct ScraperFactory;

impl ScraperFactory {
    /// 创建指定平台的抓取器（使用真实HTTP客户端与线程休眠）
    pub fn create(
        platform_type: PlatformType,
        config: &ScraperConfig,
        sink: Arc<dyn CommentSink>,
    ) -> Result<Box<dyn CommentScraper>, ScrapeError> {
        let http: Arc<dyn JsonFetcher> = Arc::new(BlockingHttp::new(config.request_timeout)?);
        let governor = RateGovernor::new(config.page_delay);
        Ok(Self::create_with(platform_type, config, http, governor, sink))
    }

    /// 使用给定的传输层与限速器创建抓取器
    pub fn create_with(
        platform_type: PlatformType,
        config: &ScraperConfig,
        http: Arc<dyn JsonFetcher>,
        governor: RateGovernor,
        sink: Arc<dyn CommentSink>,
    ) -> Box<dyn CommentScraper> {
        tracing::debug!("[Factory] 创建 {} 抓取器", platform_type.display_name());
        match platform_type {
            PlatformType::Instagram => Box::new(InstagramScraper::new(
                http,
                config.instagram_cookies.clone(),
                config.user_agent.clone(),
                config.page_size,
                governor,
                sink,
            )),
            PlatformType::TikTok => Box::new(TikTokScraper::new(
                http,
                config.user_agent.clone(),
                config.page_size,
                governor,
                sink,
            )),
        }
    }

    /// 获取所有支持的平台类型
    pub fn supported_platforms() -> Vec<PlatformType> {
        vec![PlatformType::Instagram, PlatformType::TikTok]
    }

    /// 检查平台标签是否受支持
    pub fn is_supported(tag: &str) -> bool {
        PlatformType::from_tag(tag).is_some()
    }
}

/// 从帖子链接抓取评论
///
/// 平台标签无效或链接中提取不到ID时，在发起任何请求前返回 [`ScrapeError::InvalidInput`]
pub fn scrape_url(
    url: &str,
    platform_tag: &str,
    config: &ScraperConfig,
    sink: Arc<dyn CommentSink>,
) -> Result<Vec<Comment>, ScrapeError> {
    let platform = PlatformType::from_tag(platform_tag)
        .ok_or_else(|| ScrapeError::InvalidInput(format!("不支持的平台: {}", platform_tag)))?;
    let post_id = extract_post_id(url, platform_tag)
        .ok_or_else(|| ScrapeError::InvalidInput(format!("无法从链接提取{}帖子ID: {}", platform.display_name(), url)))?;

    let scraper = ScraperFactory::create(platform, config, sink)?;
    Ok(scraper.scrape_comments(&post_id))
}
