//! Scrape Progress
//!
//! 每解析出一条评论就向外部事件接收器推送一次，
//! 宿主应用无需等待整个抓取结束即可展示实时进度

use std::sync::mpsc::Sender;
use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use super::{Comment, PlatformType};
use crate::utils::preview_text;

/// 评论发现事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEvent {
    pub platform: PlatformType,
    pub post_id: String,
    pub username: String,
    /// 截断后的评论内容（最多100字符）
    pub preview: String,
    pub timestamp: i64,
}

impl CommentEvent {
    pub fn from_comment(platform: PlatformType, comment: &Comment) -> Self {
        Self {
            platform,
            post_id: comment.post_id.clone(),
            username: comment.username.clone(),
            preview: preview_text(&comment.comment_text),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// 评论事件接收器
///
/// 在构造抓取器时注入，每条被发现的评论调用一次
pub trait CommentSink: Send + Sync {
    fn on_comment(&self, event: &CommentEvent);
}

impl<F> CommentSink for F
where
    F: Fn(&CommentEvent) + Send + Sync,
{
    fn on_comment(&self, event: &CommentEvent) {
        self(event)
    }
}

/// 丢弃所有事件
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl CommentSink for NoopSink {
    fn on_comment(&self, _event: &CommentEvent) {}
}

/// 输出到 tracing 日志：`username - preview`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl CommentSink for TracingSink {
    fn on_comment(&self, event: &CommentEvent) {
        tracing::info!(
            platform = %event.platform,
            post_id = %event.post_id,
            "{} - {}",
            event.username,
            event.preview
        );
    }
}

/// 通过 mpsc 通道转发事件（用于跨线程展示进度）
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<CommentEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<CommentEvent>) -> Self {
        Self { sender }
    }
}

impl CommentSink for ChannelSink {
    fn on_comment(&self, event: &CommentEvent) {
        // 接收端已关闭时只记录，不影响抓取
        if self.sender.send(event.clone()).is_err() {
            tracing::debug!("[Progress] receiver dropped, event discarded: post_id={}", event.post_id);
        }
    }
}

/// 进度事件发送器
///
/// 绑定平台类型，抓取器通过它发送事件
#[derive(Clone)]
pub struct CommentEmitter {
    platform: PlatformType,
    sink: Arc<dyn CommentSink>,
}

impl CommentEmitter {
    pub fn new(platform: PlatformType, sink: Arc<dyn CommentSink>) -> Self {
        Self { platform, sink }
    }

    /// 发送评论发现事件
    pub fn emit(&self, comment: &Comment) {
        let event = CommentEvent::from_comment(self.platform, comment);
        self.sink.on_comment(&event);
    }
}

impl std::fmt::Debug for CommentEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentEmitter")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CreatedAt;
    use std::sync::{mpsc, Mutex};

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let emitter = CommentEmitter::new(PlatformType::TikTok, Arc::new(ChannelSink::new(tx)));
        emitter.emit(&Comment::new("7539", "carol", CreatedAt::Epoch(1), "hello"));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.platform, PlatformType::TikTok);
        assert_eq!(event.username, "carol");
        assert_eq!(event.preview, "hello");
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = ChannelSink::new(tx);
        let comment = Comment::new("1", "u", CreatedAt::default(), "t");
        sink.on_comment(&CommentEvent::from_comment(PlatformType::Instagram, &comment));
    }

    #[test]
    fn test_closure_sink_and_preview_truncation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = move |event: &CommentEvent| captured.lock().unwrap().push(event.preview.clone());
        let emitter = CommentEmitter::new(PlatformType::Instagram, Arc::new(sink));

        emitter.emit(&Comment::new("p", "u", CreatedAt::default(), "x".repeat(150)));

        let previews = seen.lock().unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0], format!("{}...", "x".repeat(100)));
    }
}
