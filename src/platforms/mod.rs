// Platforms module
// 平台模块
//
// 提供各平台（Instagram、TikTok）的评论抓取实现
// 使用工厂模式按平台类型选择实现
//
// # 模块结构
//
// - [instagram](instagram/index.html) - Instagram GraphQL 评论抓取
// - [tiktok](tiktok/index.html) - TikTok 评论抓取

pub mod factory;
pub mod instagram;
pub mod tiktok;
pub mod traits;

pub use self::factory::{scrape_url, ScraperFactory};
pub use self::traits::CommentScraper;
