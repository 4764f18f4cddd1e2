//! 游标分页遍历
//!
//! 反复以游标请求同一接口直到数据耗尽：
//!
//! - 空页（平台未返回任何原始记录）：无条件停止（不看 `has_next`）
//! - `has_next == false`：停止
//! - 下一游标已被使用过：停止，防止死循环
//! - 请求或解析失败：记录错误并返回已累计的数据
//!
//! 两次翻页之间由 [`RateGovernor`] 固定休眠，避免触发平台限流

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use super::ScrapeError;

/// 单页结果
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    /// 下一页游标（平台提供，不透明）
    pub next_cursor: String,
    /// 平台返回的原始记录数（含被过滤掉的空节点），决定是否为空页
    pub fetched: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next: bool, next_cursor: impl Into<String>) -> Self {
        Self {
            fetched: items.len(),
            items,
            has_next,
            next_cursor: next_cursor.into(),
        }
    }

    /// 设置原始记录数（解析时过滤掉了部分节点）
    pub fn with_fetched(mut self, fetched: usize) -> Self {
        self.fetched = fetched.max(self.items.len());
        self
    }

    /// 最后一页
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, false, "")
    }
}

/// 遍历结束原因
#[derive(Debug)]
pub enum StopReason {
    /// `has_next` 为 false
    Exhausted,
    /// 返回了空页
    EmptyPage,
    /// 平台返回了已使用过的游标
    CursorReused,
    /// 请求或解析失败，已返回部分结果
    Failed(ScrapeError),
}

/// 遍历结果
#[derive(Debug)]
pub struct Walk<T> {
    pub items: Vec<T>,
    /// 发起的请求次数（含失败的一次）
    pub pages_fetched: usize,
    pub stop: StopReason,
}

/// 休眠抽象，测试中可替换为记录型实现
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// 真实线程休眠
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// 翻页限速器：两次翻页之间固定休眠
#[derive(Clone)]
pub struct RateGovernor {
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RateGovernor {
    pub fn new(delay: Duration) -> Self {
        Self::with_sleeper(delay, Arc::new(ThreadSleeper))
    }

    pub fn with_sleeper(delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { delay, sleeper }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pause(&self) {
        self.sleeper.sleep(self.delay);
    }
}

impl std::fmt::Debug for RateGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGovernor")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// 游标遍历器
///
/// 绑定到某个接口的抓取函数 `(cursor, page_size) -> Page<T>`，
/// 不设页数上限，需要上限的调用方自行在外层控制
#[derive(Debug, Clone, Copy)]
pub struct CursorWalker<'a> {
    label: &'a str,
    page_size: u32,
    governor: &'a RateGovernor,
}

impl<'a> CursorWalker<'a> {
    pub fn new(label: &'a str, page_size: u32, governor: &'a RateGovernor) -> Self {
        Self {
            label,
            page_size,
            governor,
        }
    }

    /// 从空游标开始遍历直到结束
    pub fn walk<T, F>(&self, mut fetch: F) -> Walk<T>
    where
        F: FnMut(&str, u32) -> Result<Page<T>, ScrapeError>,
    {
        let mut items: Vec<T> = Vec::new();
        let mut consumed: HashSet<String> = HashSet::new();
        let mut cursor = String::new();
        let mut pages_fetched = 0usize;

        loop {
            consumed.insert(cursor.clone());
            pages_fetched += 1;

            let page = match fetch(&cursor, self.page_size) {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        "[Walker] {} 第 {} 页失败，返回已获取的 {} 条: {}",
                        self.label, pages_fetched, items.len(), e
                    );
                    return Walk { items, pages_fetched, stop: StopReason::Failed(e) };
                }
            };

            let count = page.items.len();
            items.extend(page.items);
            tracing::debug!(
                "[Walker] {} 第 {} 页: {}/{} 条，累计 {}，has_next={}",
                self.label, pages_fetched, count, page.fetched, items.len(), page.has_next
            );

            if page.fetched == 0 {
                return Walk { items, pages_fetched, stop: StopReason::EmptyPage };
            }
            if !page.has_next {
                return Walk { items, pages_fetched, stop: StopReason::Exhausted };
            }
            if consumed.contains(&page.next_cursor) {
                tracing::warn!(
                    "[Walker] {} 游标重复({:?})，停止翻页",
                    self.label, page.next_cursor
                );
                return Walk { items, pages_fetched, stop: StopReason::CursorReused };
            }

            tracing::debug!("[Walker] {} 等待 {:?} 后翻页", self.label, self.governor.delay());
            self.governor.pause();
            cursor = page.next_cursor;
        }
    }
}
