//! 抓取配置
//!
//! Scraper configuration loaded from the environment (and `.env` when present)
//!
//! - `SCRAPER_PAGE_SIZE` / `SCRAPER_DELAY_SECS` / `SCRAPER_TIMEOUT_SECS` / `SCRAPER_USER_AGENT`
//! - `INSTAGRAM_COOKIES_JSON`：Cookie 四元组的 JSON
//! - `INSTAGRAM_SESSION_ID` / `INSTAGRAM_DS_USER_ID` / `INSTAGRAM_CSRF_TOKEN` / `INSTAGRAM_MID`：
//!   单项覆盖 JSON 中的同名字段

use std::time::Duration;

use thiserror::Error;

use crate::platforms::instagram::InstagramCookies;

/// 默认每页数量
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// 单页最大数量（平台接口上限）
pub const MAX_PAGE_SIZE: u32 = 100;

/// 默认翻页间隔（秒）
pub const DEFAULT_PAGE_DELAY_SECS: u64 = 2;

/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub page_size: u32,
    pub page_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: Option<String>,
    pub instagram_cookies: InstagramCookies,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_secs(DEFAULT_PAGE_DELAY_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            instagram_cookies: InstagramCookies::default(),
        }
    }
}

impl ScraperConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size = read_u64(&lookup, "SCRAPER_PAGE_SIZE", DEFAULT_PAGE_SIZE as u64)?;
        let page_size = validate_page_size(page_size)?;
        let delay_secs = read_u64(&lookup, "SCRAPER_DELAY_SECS", DEFAULT_PAGE_DELAY_SECS)?;
        let timeout_secs = read_u64(&lookup, "SCRAPER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("SCRAPER_TIMEOUT_SECS", "0".to_string()));
        }
        let user_agent = read_optional_string(&lookup, "SCRAPER_USER_AGENT");

        let instagram_cookies = read_cookies(&lookup)?;

        Ok(Self {
            page_size,
            page_delay: Duration::from_secs(delay_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            user_agent,
            instagram_cookies,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        self.page_size = validate_page_size(page_size as u64)?;
        Ok(self)
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

fn validate_page_size(value: u64) -> Result<u32, ConfigError> {
    if value == 0 || value > MAX_PAGE_SIZE as u64 {
        return Err(ConfigError::InvalidValue("SCRAPER_PAGE_SIZE", value.to_string()));
    }
    Ok(value as u32)
}

fn read_cookies<F>(lookup: &F) -> Result<InstagramCookies, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cookies = match read_optional_string(lookup, "INSTAGRAM_COOKIES_JSON") {
        Some(json) => InstagramCookies::from_json(&json)
            .map_err(|e| ConfigError::InvalidValue("INSTAGRAM_COOKIES_JSON", e.to_string()))?,
        None => InstagramCookies::default(),
    };

    let fields = [
        ("INSTAGRAM_SESSION_ID", &mut cookies.sessionid),
        ("INSTAGRAM_DS_USER_ID", &mut cookies.ds_user_id),
        ("INSTAGRAM_CSRF_TOKEN", &mut cookies.csrftoken),
        ("INSTAGRAM_MID", &mut cookies.mid),
    ];
    for (key, field) in fields {
        if let Some(value) = read_optional_string(lookup, key) {
            *field = value;
        }
    }

    Ok(cookies)
}

fn read_optional_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_u64<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match read_optional_string(lookup, key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(key, value)),
        None => Ok(default),
    }
}
