//! Instagram GraphQL 响应解析
//!
//! 父评论: `data.shortcode_media.edge_media_to_parent_comment`
//! 回复:   `data.comment.edge_threaded_comments`
//!
//! 两者都是 `{ count, page_info: { has_next_page, end_cursor }, edges: [{ node }] }`

use serde_json::Value;
use crate::core::pagination::Page;
use crate::core::{string_field, Comment, CreatedAt, ScrapeError};

/// 父评论节点（带回复数，用于决定是否展开回复）
#[derive(Debug, Clone, PartialEq)]
pub struct ParentNode {
    pub comment_id: String,
    pub comment: Comment,
    pub reply_count: i64,
}

/// 解析一页父评论
///
/// - 缺少 `shortcode_media`：帖子不存在或无权限，返回 [`ScrapeError::MissingContainer`]
/// - 有帖子但无评论容器：视为没有评论，返回空的最后一页
/// - 评论容器存在但 edges 为空：正常的数据末尾
pub fn parse_parent_page(data: &Value, shortcode: &str) -> Result<Page<ParentNode>, ScrapeError> {
    let media = &data["data"]["shortcode_media"];
    if !is_present(media) {
        if let Some(message) = data.get("message").and_then(|v| v.as_str()) {
            tracing::error!("[Instagram] 接口返回错误: {}", message);
        }
        return Err(ScrapeError::MissingContainer("shortcode_media"));
    }

    let edge_info = &media["edge_media_to_parent_comment"];
    if !is_present(edge_info) {
        tracing::warn!("[Instagram] 帖子 {} 没有评论", shortcode);
        return Ok(Page::last(Vec::new()));
    }

    let connection = parse_connection(edge_info)?;
    let items = connection
        .nodes
        .iter()
        .map(|node| ParentNode {
            comment_id: string_field(node, "id"),
            comment: normalize_node(node, shortcode),
            reply_count: node["edge_threaded_comments"]["count"].as_i64().unwrap_or(0),
        })
        .collect();

    Ok(Page::new(items, connection.has_next, connection.end_cursor).with_fetched(connection.raw_len))
}

/// 解析一页回复，缺少容器时视为没有更多回复
pub fn parse_reply_page(data: &Value, shortcode: &str) -> Result<Page<Comment>, ScrapeError> {
    let edge_info = &data["data"]["comment"]["edge_threaded_comments"];
    if !is_present(edge_info) {
        return Ok(Page::last(Vec::new()));
    }

    let connection = parse_connection(edge_info)?;
    let items = connection
        .nodes
        .iter()
        .map(|node| normalize_node(node, shortcode))
        .collect();

    Ok(Page::new(items, connection.has_next, connection.end_cursor).with_fetched(connection.raw_len))
}

/// 评论节点 → 统一评论记录
pub fn normalize_node(node: &Value, shortcode: &str) -> Comment {
    Comment {
        post_id: shortcode.to_string(),
        username: string_field(&node["owner"], "username"),
        created_at: CreatedAt::from_value(&node["created_at"]),
        comment_text: string_field(node, "text"),
    }
}

/// 一页 edges 解析结果
struct Connection<'a> {
    /// 非空节点
    nodes: Vec<&'a Value>,
    /// 原始 edges 数（含空节点）
    raw_len: usize,
    has_next: bool,
    end_cursor: String,
}

/// 取出非空节点列表与分页信息
///
/// 空节点被跳过，但仍计入 `raw_len`，翻页照常继续
fn parse_connection(edge_info: &Value) -> Result<Connection<'_>, ScrapeError> {
    let edges: &[Value] = match &edge_info["edges"] {
        Value::Array(edges) => edges.as_slice(),
        Value::Null => &[],
        other => {
            return Err(ScrapeError::ParseError(format!(
                "edges 不是数组: {}",
                type_name(other)
            )))
        }
    };

    let nodes: Vec<&Value> = edges
        .iter()
        .map(|edge| &edge["node"])
        .filter(|node| is_present(node))
        .collect();
    if nodes.len() < edges.len() {
        tracing::debug!("[Instagram] 跳过 {} 个空节点", edges.len() - nodes.len());
    }

    let page_info = &edge_info["page_info"];
    Ok(Connection {
        nodes,
        raw_len: edges.len(),
        has_next: page_info["has_next_page"].as_bool().unwrap_or(false),
        end_cursor: string_field(page_info, "end_cursor"),
    })
}

/// 非空对象
fn is_present(value: &Value) -> bool {
    value.as_object().map(|o| !o.is_empty()).unwrap_or(false)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
