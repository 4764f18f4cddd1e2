//! HTTP 传输层
//!
//! 抓取器只依赖 [`JsonFetcher`]，生产环境使用基于 `reqwest::blocking` 的
//! [`BlockingHttp`]，测试中可替换为脚本化的假实现

use std::time::Duration;
use serde_json::Value;
use super::ScrapeError;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// 单个 GET 请求描述
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonRequest {
    pub base_url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl JsonRequest {
    pub fn get(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    /// 查询参数值
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 拼接完整URL（参数值做URL编码）
    pub fn url(&self) -> String {
        let mut url = self.base_url.clone();
        if !self.query.is_empty() {
            url.push('?');
            let param_list: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            url.push_str(&param_list.join("&"));
        }
        url
    }
}

/// 发送请求并返回JSON
pub trait JsonFetcher: Send + Sync {
    fn get_json(&self, request: &JsonRequest) -> Result<Value, ScrapeError>;
}

/// 阻塞式HTTP客户端
///
/// 每个抓取器实例持有自己的客户端（连接池与Cookie互不共享）
#[derive(Debug, Clone)]
pub struct BlockingHttp {
    client: reqwest::blocking::Client,
}

impl BlockingHttp {
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScrapeError::NetworkError(format!("创建HTTP客户端失败: {}", e)))?;
        Ok(Self { client })
    }
}

impl JsonFetcher for BlockingHttp {
    fn get_json(&self, request: &JsonRequest) -> Result<Value, ScrapeError> {
        let url = request.url();
        tracing::debug!("[Http] GET {}", request.base_url);

        let mut builder = self.client.get(&url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .map_err(|e| ScrapeError::NetworkError(format!("请求失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: request.base_url.clone(),
            });
        }

        let text = response
            .text()
            .map_err(|e| ScrapeError::NetworkError(format!("读取响应失败: {}", e)))?;

        tracing::debug!("[Http] 响应长度: {}", text.len());

        serde_json::from_str(&text)
            .map_err(|e| ScrapeError::ParseError(format!("解析JSON失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let request = JsonRequest::get("https://example.com/api/test")
            .query("key1", "value1")
            .query("vars", r#"{"a":1}"#);

        assert_eq!(
            request.url(),
            "https://example.com/api/test?key1=value1&vars=%7B%22a%22%3A1%7D"
        );
        assert_eq!(request.param("key1"), Some("value1"));
        assert_eq!(request.param("missing"), None);
    }

    #[test]
    fn test_build_url_without_query() {
        assert_eq!(JsonRequest::get("https://example.com/x").url(), "https://example.com/x");
    }
}
