//! 评论抓取 trait 定义
//!
//! 定义各平台评论抓取器的通用接口，调用方只面向此接口编写，
//! 具体平台由 [`ScraperFactory`](super::factory::ScraperFactory) 按平台类型选择

use crate::core::{Comment, PlatformType, ScrapeError};

/// 评论抓取 trait
///
/// 所有平台的评论抓取器都需要实现此接口
pub trait CommentScraper: Send + Sync {
    /// 获取平台类型
    fn platform_type(&self) -> PlatformType;

    /// 抓取评论
    ///
    /// 只有输入无效（ID格式错误）时返回错误，网络与解析错误在内部记录后
    /// 以部分结果或空结果返回
    fn try_scrape(&self, post_id: &str) -> Result<Vec<Comment>, ScrapeError>;

    /// 抓取评论，任何错误都折叠为空结果
    ///
    /// # 返回
    ///
    /// 按发现顺序排列的评论；空列表表示“没有评论或抓取失败”
    fn scrape_comments(&self, post_id: &str) -> Vec<Comment> {
        match self.try_scrape(post_id) {
            Ok(comments) => comments,
            Err(e) => {
                tracing::error!("[{}] 抓取 {} 失败: {}", self.platform_type().display_name(), post_id, e);
                Vec::new()
            }
        }
    }
}
