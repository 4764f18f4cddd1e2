//! Instagram 评论抓取
//!
//! 按 shortcode 抓取帖子的全部父评论，每条父评论之后紧跟其全部回复（深度优先）
//!
//! # 流程
//!
//! 1. 构建请求头（一次）
//! 2. 游标遍历父评论
//! 3. 每条父评论：归一化 → 推送事件 → 回复数 > 0 时遍历回复
//! 4. 翻页间隔休眠，直到没有下一页

use std::sync::Arc;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::core::http::JsonFetcher;
use crate::core::pagination::{CursorWalker, Page, RateGovernor, StopReason};
use crate::core::{Comment, CommentEmitter, CommentSink, PlatformType, ScrapeError};
use crate::platforms::traits::CommentScraper;
use super::client::{InstagramClient, PARENT_QUERY_HASH, REPLY_QUERY_HASH};
use super::credentials::InstagramCookies;
use super::parser::{parse_parent_page, parse_reply_page};

static SHORTCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid shortcode regex")
});

/// Instagram 评论抓取器
#[derive(Debug, Clone)]
pub struct InstagramScraper {
    client: InstagramClient,
    page_size: u32,
    governor: RateGovernor,
    emitter: CommentEmitter,
}

impl InstagramScraper {
    pub fn new(
        http: Arc<dyn JsonFetcher>,
        cookies: InstagramCookies,
        user_agent: Option<String>,
        page_size: u32,
        governor: RateGovernor,
        sink: Arc<dyn CommentSink>,
    ) -> Self {
        Self {
            client: InstagramClient::new(http, cookies, user_agent),
            page_size,
            governor,
            emitter: CommentEmitter::new(PlatformType::Instagram, sink),
        }
    }

    /// 替换登录 Cookie
    pub fn update_cookies(&mut self, cookies: InstagramCookies) {
        self.client.update_cookies(cookies);
    }

    /// 抓取帖子的父评论及其全部回复
    ///
    /// 父评论容器缺失（帖子不存在或无权限）时记录错误并返回已获取的数据
    pub fn fetch_comments(&self, shortcode: &str) -> Vec<Comment> {
        tracing::info!("[Instagram] 开始抓取帖子 {} 的评论...", shortcode);

        let headers = self.client.build_headers(shortcode);
        let walker = CursorWalker::new("instagram/comments", self.page_size, &self.governor);

        let walk = walker.walk(|cursor, first| {
            if !cursor.is_empty() {
                tracing::info!("[Instagram] 获取下一页评论...");
            }
            let variables = InstagramClient::parent_variables(shortcode, first, cursor);
            let data = self.client.graphql_request(PARENT_QUERY_HASH, &variables, &headers)?;
            let page = parse_parent_page(&data, shortcode)?;

            let mut comments = Vec::with_capacity(page.items.len());
            for node in page.items {
                self.emitter.emit(&node.comment);
                comments.push(node.comment);

                if node.reply_count > 0 {
                    tracing::info!(
                        "[Instagram] 获取评论 {} 的 {} 条回复",
                        node.comment_id, node.reply_count
                    );
                    comments.extend(self.fetch_replies_with(shortcode, &node.comment_id, &headers));
                }
            }

            Ok(Page::new(comments, page.has_next, page.next_cursor).with_fetched(page.fetched))
        });

        if let StopReason::Failed(ScrapeError::MissingContainer(_)) = &walk.stop {
            tracing::error!("[Instagram] 帖子 {} 数据无效（不存在、无权限或Cookie失效）", shortcode);
        }

        walk.items
    }

    /// 抓取某条父评论的全部回复
    pub fn fetch_replies(&self, shortcode: &str, comment_id: &str) -> Vec<Comment> {
        let headers = self.client.build_headers(shortcode);
        self.fetch_replies_with(shortcode, comment_id, &headers)
    }

    fn fetch_replies_with(
        &self,
        shortcode: &str,
        comment_id: &str,
        headers: &[(String, String)],
    ) -> Vec<Comment> {
        let walker = CursorWalker::new("instagram/replies", self.page_size, &self.governor);

        let walk = walker.walk(|cursor, first| {
            let variables = InstagramClient::reply_variables(comment_id, first, cursor);
            let data = self.client.graphql_request(REPLY_QUERY_HASH, &variables, headers)?;
            let page = parse_reply_page(&data, shortcode)?;
            for reply in &page.items {
                self.emitter.emit(reply);
            }
            Ok(page)
        });

        walk.items
    }
}

impl CommentScraper for InstagramScraper {
    fn platform_type(&self) -> PlatformType {
        PlatformType::Instagram
    }

    fn try_scrape(&self, post_id: &str) -> Result<Vec<Comment>, ScrapeError> {
        let shortcode = post_id.trim();
        if !SHORTCODE_RE.is_match(shortcode) {
            return Err(ScrapeError::InvalidInput(format!("无效的 shortcode: {:?}", post_id)));
        }

        let comments = self.fetch_comments(shortcode);
        tracing::info!(
            "[Instagram] 帖子 {} 抓取完成，共 {} 条评论",
            shortcode,
            comments.len()
        );
        Ok(comments)
    }
}
