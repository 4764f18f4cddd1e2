//! TikTok 平台模块
//!
//! 通过网页端评论接口抓取短视频评论（数字视频ID寻址，无需登录）
//!
//! # 模块结构
//!
//! - [`models`] - 原始评论结构与字段映射
//! - [`client`] - HTTP客户端
//! - [`comments`] - 评论抓取（分页、回复展开、扁平化）

/// 原始评论结构
pub mod models;

/// HTTP客户端
pub mod client;

/// 评论抓取器
pub mod comments;

pub use self::comments::{flatten_comments, TikTokScraper};
pub use self::models::{CommentsPage, TikTokComment};
