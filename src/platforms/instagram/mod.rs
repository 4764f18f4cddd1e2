//! Instagram 平台模块
//!
//! 通过网页端 GraphQL 接口抓取帖子评论（shortcode 寻址，需要 Cookie）
//!
//! # 模块结构
//!
//! - [`credentials`] - Cookie 凭证
//! - [`client`] - GraphQL 请求
//! - [`parser`] - 响应解析与归一化
//! - [`comments`] - 评论抓取（父评论 + 回复）

/// Cookie 凭证
pub mod credentials;

/// GraphQL 客户端
pub mod client;

/// 响应解析
pub mod parser;

/// 评论抓取器
pub mod comments;

pub use self::comments::InstagramScraper;
pub use self::credentials::InstagramCookies;
