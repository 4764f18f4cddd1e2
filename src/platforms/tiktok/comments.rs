//! TikTok 评论抓取
//!
//! 按数字视频ID（aweme id）抓取全部评论，回复在评论返回前完整展开，
//! 最终按先序遍历展开为统一评论记录
//!
//! # 错误策略
//!
//! 任一页失败只影响该页所在的子树（记录日志后返回空/部分结果），
//! 兄弟评论的回复仍会继续获取

use std::collections::HashSet;
use std::sync::Arc;
use serde_json::Value;
use crate::core::http::JsonFetcher;
use crate::core::pagination::{CursorWalker, Page, RateGovernor, StopReason};
use crate::core::{Comment, CommentEmitter, CommentSink, PlatformType, ScrapeError};
use crate::platforms::traits::CommentScraper;
use super::client::TikTokClient;
use super::models::{flag_field, int_field, map_comment, map_share_info, CommentsPage, TikTokComment};

/// TikTok 评论抓取器
#[derive(Debug, Clone)]
pub struct TikTokScraper {
    client: TikTokClient,
    page_size: u32,
    governor: RateGovernor,
    emitter: CommentEmitter,
}

/// 展开回复时的栈帧：当前评论及其尚未处理的直接回复
struct Frame {
    comment: TikTokComment,
    pending: std::vec::IntoIter<TikTokComment>,
}

impl TikTokScraper {
    pub fn new(
        http: Arc<dyn JsonFetcher>,
        user_agent: Option<String>,
        page_size: u32,
        governor: RateGovernor,
        sink: Arc<dyn CommentSink>,
    ) -> Self {
        Self {
            client: TikTokClient::new(http, user_agent),
            page_size,
            governor,
            emitter: CommentEmitter::new(PlatformType::TikTok, sink),
        }
    }

    // -------------------------------------------------------------------------
    // 评论
    // -------------------------------------------------------------------------

    /// 获取单页评论（page 从1开始），失败时返回空结果
    pub fn get_comments(&self, item_id: &str, page_size: u32, page: u32) -> CommentsPage {
        match self.fetch_comments_page(item_id, page_size, page) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("[TikTok] 获取评论失败: {}", e);
                CommentsPage::default()
            }
        }
    }

    /// 获取全部评论
    ///
    /// 第1页提供标题与链接，之后逐页累加，直到某页 `has_more = false` 或为空。
    /// 返回值的 `has_more` 恒为 false，中途失败只记录日志并保留已获取的评论
    pub fn get_all_comments(&self, item_id: &str) -> CommentsPage {
        let mut share: Option<(String, String)> = None;
        let walker = CursorWalker::new("tiktok/comments", self.page_size, &self.governor);

        let walk = walker.walk(|cursor, size| {
            // 游标为页码，空游标即第1页
            let page: u32 = cursor.parse().unwrap_or(1);
            let result = self.fetch_comments_page(item_id, size, page)?;
            if share.is_none() {
                share = Some((result.caption, result.video_url));
            }
            Ok(Page::new(result.comments, result.has_more, (page + 1).to_string()))
        });

        if let StopReason::Failed(e) = &walk.stop {
            tracing::warn!(
                "[TikTok] 视频 {} 评论未完整获取，保留 {} 条: {}",
                item_id, walk.items.len(), e
            );
        }

        let (caption, video_url) = share.unwrap_or_default();
        CommentsPage {
            caption,
            video_url,
            has_more: false,
            comments: walk.items,
        }
    }

    fn fetch_comments_page(&self, item_id: &str, page_size: u32, page: u32) -> Result<CommentsPage, ScrapeError> {
        let cursor = (page.max(1) as u64 - 1) * page_size as u64;
        let data = self.client.comment_list(item_id, page_size, cursor)?;
        let raw = comment_array(&data)?;

        let (caption, video_url) = map_share_info(raw);
        let has_more = flag_field(&data["has_more"]).unwrap_or(false);
        let comments = raw
            .iter()
            .map(|node| self.parse_comment(item_id, node))
            .collect();

        Ok(CommentsPage {
            caption,
            video_url,
            comments,
            has_more,
        })
    }

    /// 解析单条评论，回复数 > 0 时先完整展开回复再返回
    pub fn parse_comment(&self, item_id: &str, node: &Value) -> TikTokComment {
        let comment = map_comment(node);
        self.emitter.emit(&comment.to_comment(item_id));

        if comment.total_reply > 0 {
            self.expand_replies(item_id, comment)
        } else {
            comment
        }
    }

    // -------------------------------------------------------------------------
    // 回复
    // -------------------------------------------------------------------------

    /// 获取某条评论的全部回复（含回复的回复）
    pub fn get_all_replies(&self, item_id: &str, comment_id: &str) -> Vec<TikTokComment> {
        let root = TikTokComment {
            comment_id: comment_id.to_string(),
            total_reply: 1,
            ..Default::default()
        };
        self.expand_replies(item_id, root).replies
    }

    /// 用显式栈展开回复树，避免深层递归
    ///
    /// 同一评论ID只展开一次
    fn expand_replies(&self, item_id: &str, root: TikTokComment) -> TikTokComment {
        let mut expanded: HashSet<String> = HashSet::new();
        expanded.insert(root.comment_id.clone());

        let pending = self.fetch_replies(item_id, &root.comment_id).into_iter();
        let mut stack = vec![Frame { comment: root, pending }];
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(child) if child.total_reply > 0 && expanded.insert(child.comment_id.clone()) => {
                    let pending = self.fetch_replies(item_id, &child.comment_id).into_iter();
                    stack.push(Frame { comment: child, pending });
                }
                Some(child) => frame.comment.replies.push(child),
                None => {
                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.comment.replies.push(done.comment),
                            None => finished = Some(done.comment),
                        }
                    }
                }
            }
        }

        finished.unwrap_or_default()
    }

    /// 遍历一条评论的全部回复页（不展开下一层）
    fn fetch_replies(&self, item_id: &str, comment_id: &str) -> Vec<TikTokComment> {
        let walker = CursorWalker::new("tiktok/replies", self.page_size, &self.governor);

        let walk = walker.walk(|cursor, size| {
            let offset: u64 = cursor.parse().unwrap_or(0);
            let data = self.client.reply_list(item_id, comment_id, size, offset)?;
            let raw = comment_array(&data)?;

            let replies: Vec<TikTokComment> = raw
                .iter()
                .map(|node| {
                    let reply = map_comment(node);
                    self.emitter.emit(&reply.to_comment(item_id));
                    reply
                })
                .collect();

            let has_next = flag_field(&data["has_more"]).unwrap_or(!replies.is_empty());
            let returned = int_field(&data["cursor"]).max(0) as u64;
            let next = if returned > offset {
                returned
            } else {
                offset + replies.len() as u64
            };

            Ok(Page::new(replies, has_next, next.to_string()))
        });

        walk.items
    }
}

/// `comments` 字段：缺失/null 视为空列表
fn comment_array(data: &Value) -> Result<&[Value], ScrapeError> {
    match &data["comments"] {
        Value::Array(comments) => Ok(comments.as_slice()),
        Value::Null => Ok(&[] as &[Value]),
        _ => Err(ScrapeError::ParseError("comments 不是数组".to_string())),
    }
}

/// 先序展开：父评论后紧跟其全部回复
pub fn flatten_comments(item_id: &str, comments: &[TikTokComment]) -> Vec<Comment> {
    let mut flat = Vec::new();
    let mut stack: Vec<&TikTokComment> = comments.iter().rev().collect();

    while let Some(comment) = stack.pop() {
        flat.push(comment.to_comment(item_id));
        stack.extend(comment.replies.iter().rev());
    }

    flat
}

impl CommentScraper for TikTokScraper {
    fn platform_type(&self) -> PlatformType {
        PlatformType::TikTok
    }

    fn try_scrape(&self, post_id: &str) -> Result<Vec<Comment>, ScrapeError> {
        let item_id = post_id.trim();
        if item_id.is_empty() || !item_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ScrapeError::InvalidInput(format!("无效的视频ID: {:?}", post_id)));
        }

        tracing::info!("[TikTok] 开始抓取视频 {} 的评论...", item_id);
        let result = self.get_all_comments(item_id);
        let comments = flatten_comments(item_id, &result.comments);
        tracing::info!("[TikTok] 视频 {} 抓取完成，共 {} 条评论", item_id, comments.len());

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::JsonRequest;
    use crate::core::pagination::Sleeper;
    use crate::core::{CreatedAt, NoopSink};
    use crate::platforms::tiktok::client::{COMMENT_LIST_URL, REPLY_LIST_URL};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    /// key: "list:<aweme_id>:<cursor>" 或 "reply:<comment_id>:<cursor>"
    #[derive(Default)]
    struct FakeApi {
        responses: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn on(mut self, key: &str, response: Value) -> Self {
            self.responses.insert(key.to_string(), response);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl JsonFetcher for FakeApi {
        fn get_json(&self, request: &JsonRequest) -> Result<Value, ScrapeError> {
            let cursor = request.param("cursor").unwrap_or("0");
            let key = if request.base_url == COMMENT_LIST_URL {
                format!("list:{}:{}", request.param("aweme_id").unwrap_or(""), cursor)
            } else if request.base_url == REPLY_LIST_URL {
                format!("reply:{}:{}", request.param("comment_id").unwrap_or(""), cursor)
            } else {
                panic!("unexpected url {}", request.base_url);
            };
            self.calls.lock().unwrap().push(key.clone());
            self.responses
                .get(&key)
                .cloned()
                .ok_or_else(|| ScrapeError::NetworkError(format!("connection refused: {}", key)))
        }
    }

    fn raw(cid: &str, user: &str, text: &str, replies: i64) -> Value {
        json!({
            "cid": cid,
            "text": text,
            "create_time": 1723000000,
            "reply_comment_total": replies,
            "user": { "unique_id": user, "nickname": user.to_uppercase() },
            "share_info": { "title": "caption here", "url": "https://www.tiktok.com/@u/video/1" }
        })
    }

    fn scraper(api: Arc<FakeApi>) -> TikTokScraper {
        TikTokScraper::new(
            api,
            None,
            50,
            RateGovernor::with_sleeper(Duration::from_secs(2), Arc::new(NoSleep)),
            Arc::new(NoopSink),
        )
    }

    fn texts(comments: &[Comment]) -> Vec<&str> {
        comments.iter().map(|c| c.comment_text.as_str()).collect()
    }

    #[test]
    fn test_single_page_with_replies() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({
                    "comments": [raw("c1", "amy", "comment1", 2), raw("c2", "ben", "comment2", 0)],
                    "has_more": 0
                }))
                .on("reply:c1:0", json!({
                    "comments": [raw("r1", "cat", "comment1-reply1", 0), raw("r2", "dan", "comment1-reply2", 0)],
                    "has_more": false
                })),
        );

        let comments = scraper(api.clone()).scrape_comments("1");

        assert_eq!(
            texts(&comments),
            vec!["comment1", "comment1-reply1", "comment1-reply2", "comment2"]
        );
        assert_eq!(comments[1].username, "cat");
        assert_eq!(comments[1].created_at, CreatedAt::Epoch(1723000000));
        assert_eq!(api.calls(), vec!["list:1:0", "reply:c1:0"]);
    }

    #[test]
    fn test_pages_concatenate_including_last() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({"comments": [raw("a", "u", "p1", 0)], "has_more": 1}))
                .on("list:1:50", json!({"comments": [raw("b", "u", "p2", 0)], "has_more": 1}))
                .on("list:1:100", json!({"comments": [raw("c", "u", "p3", 0)], "has_more": 0})),
        );

        let result = scraper(api.clone()).get_all_comments("1");

        let names: Vec<&str> = result.comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(names, vec!["p1", "p2", "p3"]);
        assert_eq!(result.caption, "caption here");
        assert_eq!(result.video_url, "https://www.tiktok.com/@u/video/1");
        assert!(!result.has_more);
        assert_eq!(api.calls().len(), 3);
    }

    #[test]
    fn test_mid_walk_failure_keeps_partial_pages() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({"comments": [raw("a", "u", "p1", 0)], "has_more": 1}))
                .on("list:1:50", json!({"comments": [raw("b", "u", "p2", 0)], "has_more": 1})),
        );

        let result = scraper(api.clone()).get_all_comments("1");

        let names: Vec<&str> = result.comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(names, vec!["p1", "p2"]);
        assert!(!result.has_more);
        assert_eq!(result.caption, "caption here");
        assert_eq!(api.calls(), vec!["list:1:0", "list:1:50", "list:1:100"]);
    }

    #[test]
    fn test_reply_pages_follow_offset_cursor() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({"comments": [raw("c1", "u", "p", 3)], "has_more": false}))
                .on("reply:c1:0", json!({
                    "comments": [raw("r1", "u", "r1", 0), raw("r2", "u", "r2", 0)],
                    "has_more": 1,
                    "cursor": 2
                }))
                .on("reply:c1:2", json!({"comments": [raw("r3", "u", "r3", 0)], "has_more": 0, "cursor": 3})),
        );

        let comments = scraper(api).scrape_comments("1");
        assert_eq!(texts(&comments), vec!["p", "r1", "r2", "r3"]);
    }

    #[test]
    fn test_nested_replies_are_preorder() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({"comments": [raw("c1", "u", "c1", 2), raw("c2", "u", "c2", 0)], "has_more": 0}))
                .on("reply:c1:0", json!({"comments": [raw("r1", "u", "r1", 1), raw("r2", "u", "r2", 0)], "has_more": 0}))
                .on("reply:r1:0", json!({"comments": [raw("r1a", "u", "r1a", 0)], "has_more": 0})),
        );

        let tree = scraper(api.clone()).get_all_comments("1");
        assert_eq!(tree.comments[0].replies.len(), 2);
        assert_eq!(tree.comments[0].replies[0].replies[0].comment, "r1a");

        let flat = flatten_comments("1", &tree.comments);
        assert_eq!(texts(&flat), vec!["c1", "r1", "r1a", "r2", "c2"]);
    }

    #[test]
    fn test_reply_failure_keeps_sibling_subtrees() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({"comments": [raw("c1", "u", "c1", 2), raw("c2", "u", "c2", 1)], "has_more": 0}))
                .on("reply:c2:0", json!({"comments": [raw("r2", "u", "r2", 0)], "has_more": 0})),
        );

        let comments = scraper(api).scrape_comments("1");
        assert_eq!(texts(&comments), vec!["c1", "c2", "r2"]);
    }

    #[test]
    fn test_self_referencing_reply_is_not_expanded_twice() {
        let api = Arc::new(
            FakeApi::default()
                .on("list:1:0", json!({"comments": [raw("c1", "u", "c1", 1)], "has_more": 0}))
                .on("reply:c1:0", json!({"comments": [raw("c1", "u", "echo", 1)], "has_more": 0})),
        );

        let comments = scraper(api.clone()).scrape_comments("1");
        assert_eq!(texts(&comments), vec!["c1", "echo"]);
        assert_eq!(api.calls(), vec!["list:1:0", "reply:c1:0"]);
    }

    #[test]
    fn test_first_page_failure_is_empty() {
        let api = Arc::new(FakeApi::default());
        let scraper = scraper(api);

        assert!(scraper.scrape_comments("1").is_empty());
        assert_eq!(scraper.get_comments("1", 50, 1), CommentsPage::default());
    }

    #[test]
    fn test_get_all_replies() {
        let api = Arc::new(
            FakeApi::default()
                .on("reply:c9:0", json!({"comments": [raw("r", "u", "only reply", 0)], "has_more": 0})),
        );

        let replies = scraper(api).get_all_replies("1", "c9");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].comment, "only reply");
    }

    #[test]
    fn test_invalid_item_id() {
        let api = Arc::new(FakeApi::default());
        let result = scraper(api.clone()).try_scrape("video-123");
        assert!(matches!(result, Err(ScrapeError::InvalidInput(_))));
        assert!(api.calls().is_empty());
    }
}
