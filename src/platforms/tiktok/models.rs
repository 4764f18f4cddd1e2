//! TikTok 原始评论结构与字段映射
//!
//! 每种记录形状一个映射函数，缺失或 null 字段使用默认值

use serde::Serialize;
use serde_json::Value;
use crate::core::{string_field, Comment, CreatedAt};

/// 单条评论（平台原生结构）
///
/// 每条评论独占其回复列表，回复在评论返回前已全部解析完毕
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TikTokComment {
    /// 评论ID
    pub comment_id: String,
    /// 用户唯一ID
    pub username: String,
    /// 用户昵称
    pub nickname: String,
    /// 评论内容
    pub comment: String,
    /// 评论时间（秒级时间戳）
    pub create_time: i64,
    /// 用户头像
    pub avatar: String,
    /// 回复总数
    pub total_reply: i64,
    /// 回复
    pub replies: Vec<TikTokComment>,
}

impl TikTokComment {
    /// 转换为统一评论记录，`created_at` 保留原始时间戳
    pub fn to_comment(&self, item_id: &str) -> Comment {
        Comment {
            post_id: item_id.to_string(),
            username: self.username.clone(),
            created_at: CreatedAt::Epoch(self.create_time),
            comment_text: self.comment.clone(),
        }
    }
}

/// 评论分页结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentsPage {
    /// 视频标题（取自第一条评论的分享信息）
    pub caption: String,
    /// 视频链接
    pub video_url: String,
    pub comments: Vec<TikTokComment>,
    pub has_more: bool,
}

/// 原始评论节点 → 评论（不含回复）
///
/// ```text
/// cid                          -> comment_id
/// user.unique_id               -> username
/// user.nickname                -> nickname
/// text                         -> comment
/// create_time                  -> create_time
/// user.avatar_thumb.url_list[0]-> avatar
/// reply_comment_total          -> total_reply
/// ```
pub fn map_comment(node: &Value) -> TikTokComment {
    let user = &node["user"];
    TikTokComment {
        comment_id: id_field(&node["cid"]),
        username: string_field(user, "unique_id"),
        nickname: string_field(user, "nickname"),
        comment: string_field(node, "text"),
        create_time: int_field(&node["create_time"]),
        avatar: user["avatar_thumb"]["url_list"][0]
            .as_str()
            .unwrap_or("")
            .to_string(),
        total_reply: int_field(&node["reply_comment_total"]),
        replies: Vec::new(),
    }
}

/// 第一条评论的分享信息：(标题, 链接)
pub fn map_share_info(comments: &[Value]) -> (String, String) {
    match comments.first() {
        Some(first) => {
            let share = &first["share_info"];
            (string_field(share, "title"), string_field(share, "url"))
        }
        None => (String::new(), String::new()),
    }
}

/// `has_more` 既可能是布尔值也可能是 0/1
pub fn flag_field(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// 整数字段，兼容字符串形式的数字
pub fn int_field(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// ID 字段，兼容数字形式
fn id_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
