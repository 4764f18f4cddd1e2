// Instagram HTTP客户端
// Instagram GraphQL Client
//
// 负责拼装请求头与 GraphQL 查询参数，发送请求并返回原始JSON
// 接口：
// - 父评论: query_hash = PARENT_QUERY_HASH, variables = {shortcode, first, after?}
// - 回复:   query_hash = REPLY_QUERY_HASH,  variables = {comment_id, first, after?}

use std::sync::Arc;
use serde_json::{json, Value};
use crate::core::http::{JsonFetcher, JsonRequest};
use crate::core::ScrapeError;
use super::credentials::InstagramCookies;

/// GraphQL 接口
pub const GRAPHQL_URL: &str = "https://www.instagram.com/graphql/query/";

/// 父评论查询
pub const PARENT_QUERY_HASH: &str = "97b41c52301f77ce508f55e66d17620e";

/// 回复查询
pub const REPLY_QUERY_HASH: &str = "863813fb3a4d6501723f11d1e44a42b1";

/// Web 端 App ID
const IG_APP_ID: &str = "936619743392459";

/// 移动端 User-Agent
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; SM-A125F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Mobile Safari/537.36";

/// Instagram GraphQL 客户端
#[derive(Clone)]
pub struct InstagramClient {
    http: Arc<dyn JsonFetcher>,
    cookies: InstagramCookies,
    user_agent: String,
}

impl InstagramClient {
    pub fn new(http: Arc<dyn JsonFetcher>, cookies: InstagramCookies, user_agent: Option<String>) -> Self {
        if !cookies.is_complete() {
            tracing::warn!("[Instagram] Cookie不完整，接口可能返回空数据");
        }
        Self {
            http,
            cookies,
            user_agent: user_agent.unwrap_or_else(|| MOBILE_USER_AGENT.to_string()),
        }
    }

    pub fn update_cookies(&mut self, cookies: InstagramCookies) {
        self.cookies = cookies;
        tracing::info!("[Instagram] Cookie已更新");
    }

    /// 构建请求头（每个帖子构建一次）
    pub fn build_headers(&self, shortcode: &str) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Accept".to_string(), "*/*".to_string()),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
            ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
            ("X-IG-App-ID".to_string(), IG_APP_ID.to_string()),
            ("Referer".to_string(), format!("https://www.instagram.com/p/{}/", shortcode)),
            ("Cookie".to_string(), self.cookies.to_cookie_header()),
        ]
    }

    /// 父评论变量
    pub fn parent_variables(shortcode: &str, first: u32, after: &str) -> Value {
        let mut vars = json!({ "shortcode": shortcode, "first": first });
        if !after.is_empty() {
            vars["after"] = json!(after);
        }
        vars
    }

    /// 回复变量
    pub fn reply_variables(comment_id: &str, first: u32, after: &str) -> Value {
        let mut vars = json!({ "comment_id": comment_id, "first": first });
        if !after.is_empty() {
            vars["after"] = json!(after);
        }
        vars
    }

    /// 发送 GraphQL 查询
    pub fn graphql_request(
        &self,
        query_hash: &str,
        variables: &Value,
        headers: &[(String, String)],
    ) -> Result<Value, ScrapeError> {
        // 紧凑JSON，与网页端一致
        let var_str = serde_json::to_string(variables)?;
        let request = JsonRequest::get(GRAPHQL_URL)
            .query("query_hash", query_hash)
            .query("variables", var_str)
            .headers(headers);

        tracing::debug!("[Instagram] GraphQL {} {}", query_hash, variables);
        self.http.get_json(&request)
    }
}

impl std::fmt::Debug for InstagramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramClient")
            .field("cookies", &self.cookies)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_omit_empty_cursor() {
        let vars = InstagramClient::parent_variables("abc", 50, "");
        assert_eq!(serde_json::to_string(&vars).unwrap(), r#"{"first":50,"shortcode":"abc"}"#);

        let vars = InstagramClient::reply_variables("17", 50, "QVFD");
        assert_eq!(vars["after"], "QVFD");
        assert_eq!(vars["comment_id"], "17");
    }
}
