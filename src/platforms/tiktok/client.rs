// TikTok HTTP客户端
// TikTok Web Comment API Client
//
// 接口（无需登录）：
// - 获取评论: /api/comment/list/        参数 aid, aweme_id, count, cursor
// - 获取回复: /api/comment/list/reply/  参数 aid, comment_id, item_id, count, cursor
//
// cursor 为偏移量：(page - 1) * count

use std::sync::Arc;
use serde_json::Value;
use crate::core::http::{JsonFetcher, JsonRequest, DEFAULT_USER_AGENT};
use crate::core::ScrapeError;

/// 基础URL
pub const BASE_URL: &str = "https://www.tiktok.com";

/// 评论列表
pub const COMMENT_LIST_URL: &str = "https://www.tiktok.com/api/comment/list/";

/// 回复列表
pub const REPLY_LIST_URL: &str = "https://www.tiktok.com/api/comment/list/reply/";

/// Web 端 aid
const WEB_AID: &str = "1988";

/// TikTok 评论接口客户端
#[derive(Clone)]
pub struct TikTokClient {
    http: Arc<dyn JsonFetcher>,
    user_agent: String,
}

impl TikTokClient {
    pub fn new(http: Arc<dyn JsonFetcher>, user_agent: Option<String>) -> Self {
        Self {
            http,
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Accept".to_string(), "application/json, text/plain, */*".to_string()),
            ("Referer".to_string(), format!("{}/", BASE_URL)),
        ]
    }

    /// 获取一页评论
    pub fn comment_list(&self, aweme_id: &str, count: u32, cursor: u64) -> Result<Value, ScrapeError> {
        let request = JsonRequest::get(COMMENT_LIST_URL)
            .query("aid", WEB_AID)
            .query("aweme_id", aweme_id)
            .query("count", count)
            .query("cursor", cursor)
            .headers(&self.headers());
        self.send(&request)
    }

    /// 获取一页回复
    pub fn reply_list(
        &self,
        aweme_id: &str,
        comment_id: &str,
        count: u32,
        cursor: u64,
    ) -> Result<Value, ScrapeError> {
        let request = JsonRequest::get(REPLY_LIST_URL)
            .query("aid", WEB_AID)
            .query("comment_id", comment_id)
            .query("item_id", aweme_id)
            .query("count", count)
            .query("cursor", cursor)
            .headers(&self.headers());
        self.send(&request)
    }

    fn send(&self, request: &JsonRequest) -> Result<Value, ScrapeError> {
        let data = self.http.get_json(request)?;

        // status_code 存在且非0时视为接口错误
        if let Some(code) = data.get("status_code").and_then(|v| v.as_i64()) {
            if code != 0 {
                let msg = data.get("status_msg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("未知错误");
                return Err(ScrapeError::NetworkError(format!("API错误: {} (code: {})", msg, code)));
            }
        }

        Ok(data)
    }
}

impl std::fmt::Debug for TikTokClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikTokClient")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Fixed {
        response: Value,
        last: Mutex<Option<JsonRequest>>,
    }

    impl JsonFetcher for Fixed {
        fn get_json(&self, request: &JsonRequest) -> Result<Value, ScrapeError> {
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_comment_list_query() {
        let http = Arc::new(Fixed { response: json!({"status_code": 0, "comments": []}), last: Mutex::new(None) });
        let client = TikTokClient::new(http.clone(), None);

        client.comment_list("7539605848159489286", 50, 100).unwrap();

        let last = http.last.lock().unwrap();
        let request = last.as_ref().unwrap();
        assert_eq!(request.base_url, COMMENT_LIST_URL);
        assert_eq!(request.param("aid"), Some("1988"));
        assert_eq!(request.param("aweme_id"), Some("7539605848159489286"));
        assert_eq!(request.param("count"), Some("50"));
        assert_eq!(request.param("cursor"), Some("100"));
    }

    #[test]
    fn test_reply_list_query() {
        let http = Arc::new(Fixed { response: json!({"comments": []}), last: Mutex::new(None) });
        let client = TikTokClient::new(http.clone(), Some("ua".into()));

        client.reply_list("1", "99", 20, 0).unwrap();

        let last = http.last.lock().unwrap();
        let request = last.as_ref().unwrap();
        assert_eq!(request.base_url, REPLY_LIST_URL);
        assert_eq!(request.param("comment_id"), Some("99"));
        assert_eq!(request.param("item_id"), Some("1"));
        assert!(request.headers.contains(&("User-Agent".to_string(), "ua".to_string())));
    }

    #[test]
    fn test_nonzero_status_code_is_error() {
        let http = Arc::new(Fixed {
            response: json!({"status_code": 8, "status_msg": "rate limited"}),
            last: Mutex::new(None),
        });
        let client = TikTokClient::new(http, None);

        let err = client.comment_list("1", 50, 0).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("rate limited"));
    }
}
