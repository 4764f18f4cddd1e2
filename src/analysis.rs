//! 评论情感分析接口
//!
//! 抓取结果的下游消费方：情感模型本身不在本crate中实现，
//! 通过 [`SentimentClassifier`] 接入任意分类器，本模块负责文本清洗、
//! 结果组装与统计

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::core::Comment;
use crate::utils::clean_text;

/// 情感标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }

    /// 将模型输出标签映射为标准标签
    ///
    /// 支持 `LABEL_0/1/2` 与 `NEGATIVE/NEUTRAL/POSITIVE`（大小写不敏感），未知标签返回 `None`
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "LABEL_0" | "NEGATIVE" => Some(SentimentLabel::Negative),
            "LABEL_1" | "NEUTRAL" => Some(SentimentLabel::Neutral),
            "LABEL_2" | "POSITIVE" => Some(SentimentLabel::Positive),
            _ => None,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条文本的分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// 最高类别的置信度，取值 [0, 1]
    pub score: f64,
    /// 各类别置信度
    #[serde(default)]
    pub scores: BTreeMap<SentimentLabel, f64>,
}

impl SentimentScore {
    /// 由各类别得分构造，取最高分类别作为标签
    ///
    /// 得分为空时返回中性、置信度0
    pub fn from_scores(scores: BTreeMap<SentimentLabel, f64>) -> Self {
        let scores: BTreeMap<SentimentLabel, f64> = scores
            .into_iter()
            .map(|(label, score)| (label, clamp_unit(score)))
            .collect();
        let best = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, score)| (*label, *score));
        match best {
            Some((label, score)) => Self { label, score, scores },
            None => Self::neutral(),
        }
    }

    /// 由模型原始输出 `(label, score)` 构造
    ///
    /// 标签经 [`SentimentLabel::from_model_label`] 映射，未知标签被忽略
    pub fn from_model_output<S: AsRef<str>>(output: &[(S, f64)]) -> Self {
        let mut scores = BTreeMap::new();
        for (raw, score) in output {
            match SentimentLabel::from_model_label(raw.as_ref()) {
                Some(label) => {
                    scores.insert(label, *score);
                }
                None => tracing::warn!("[Sentiment] 未知的模型标签: {}", raw.as_ref()),
            }
        }
        Self::from_scores(scores)
    }

    /// 中性、置信度0（无法分析的文本）
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            scores: BTreeMap::new(),
        }
    }
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// 情感分类器
///
/// 输入已清洗的非空文本
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> SentimentScore;
}

impl<F> SentimentClassifier for F
where
    F: Fn(&str) -> SentimentScore,
{
    fn classify(&self, text: &str) -> SentimentScore {
        self(text)
    }
}

/// 带情感结果的评论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    #[serde(default)]
    pub all_scores: BTreeMap<SentimentLabel, f64>,
}

/// 分析单条文本
///
/// 文本清洗后为空时不调用分类器，直接返回中性、置信度0
pub fn analyze_text<C: SentimentClassifier + ?Sized>(classifier: &C, text: &str) -> SentimentScore {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        tracing::debug!("[Sentiment] 清洗后文本为空，按中性处理");
        return SentimentScore::neutral();
    }
    let mut result = classifier.classify(&cleaned);
    result.score = clamp_unit(result.score);
    result
}

/// 批量分析评论，输出顺序与输入一致
pub fn analyze_comments<C: SentimentClassifier + ?Sized>(
    classifier: &C,
    comments: &[Comment],
) -> Vec<AnalyzedComment> {
    tracing::info!("[Sentiment] 开始分析 {} 条评论", comments.len());
    comments
        .iter()
        .map(|comment| {
            let result = analyze_text(classifier, &comment.comment_text);
            AnalyzedComment {
                comment: comment.clone(),
                sentiment_label: result.label,
                sentiment_score: result.score,
                all_scores: result.scores,
            }
        })
        .collect()
}

/// 情感统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub total_comments: usize,
    pub sentiment_distribution: BTreeMap<SentimentLabel, usize>,
    /// 各标签占比（百分比）
    pub sentiment_percentages: BTreeMap<SentimentLabel, f64>,
    pub average_confidence: f64,
    pub confidence_by_sentiment: BTreeMap<SentimentLabel, f64>,
}

impl SentimentStats {
    /// 汇总分析结果，结果为空时返回 `None`
    pub fn from_results(results: &[AnalyzedComment]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let total = results.len();
        let mut distribution: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
        let mut score_sums: BTreeMap<SentimentLabel, f64> = BTreeMap::new();
        let mut total_score = 0.0;

        for r in results {
            *distribution.entry(r.sentiment_label).or_insert(0) += 1;
            *score_sums.entry(r.sentiment_label).or_insert(0.0) += r.sentiment_score;
            total_score += r.sentiment_score;
        }

        let sentiment_percentages = distribution
            .iter()
            .map(|(label, count)| (*label, *count as f64 / total as f64 * 100.0))
            .collect();
        let confidence_by_sentiment = score_sums
            .iter()
            .map(|(label, sum)| (*label, sum / distribution[label] as f64))
            .collect();

        Some(Self {
            total_comments: total,
            sentiment_distribution: distribution,
            sentiment_percentages,
            average_confidence: total_score / total as f64,
            confidence_by_sentiment,
        })
    }
}
