//! Instagram 登录凭证
//!
//! 由外部（环境变量 / 配置文件）提供的 Cookie 四元组，
//! 客户端不会刷新或校验它们：失效的 Cookie 只会表现为空响应或异常响应
//!
//! # JSON结构示例
//!
//! ```json
//! {
//!     "sessionid": "xxx",
//!     "ds_user_id": "123",
//!     "csrftoken": "xxx",
//!     "mid": "xxx"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Instagram Cookie 凭证
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InstagramCookies {
    pub sessionid: String,
    pub ds_user_id: String,
    pub csrftoken: String,
    pub mid: String,
}

impl InstagramCookies {
    /// 从JSON字符串解析，空字符串返回空凭证，缺失的字段为空
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }

    /// 四项均已提供
    pub fn is_complete(&self) -> bool {
        !self.sessionid.is_empty()
            && !self.ds_user_id.is_empty()
            && !self.csrftoken.is_empty()
            && !self.mid.is_empty()
    }

    /// 生成 Cookie 请求头
    pub fn to_cookie_header(&self) -> String {
        format!(
            "sessionid={}; ds_user_id={}; csrftoken={}; mid={};",
            self.sessionid, self.ds_user_id, self.csrftoken, self.mid
        )
    }
}

// sessionid 不能出现在日志里
impl std::fmt::Debug for InstagramCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramCookies")
            .field("sessionid", &if self.sessionid.is_empty() { "" } else { "***" })
            .field("ds_user_id", &self.ds_user_id)
            .field("csrftoken", &if self.csrftoken.is_empty() { "" } else { "***" })
            .field("mid", &self.mid)
            .finish()
    }
}
