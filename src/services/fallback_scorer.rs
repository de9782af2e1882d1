//! 兜底关键词打分
//!
//! 分类能力不可用，或策展路径没有选中任何视频时使用。完全确定：
//! 相同的目标和语料总是得到相同的有序结果。
//!
//! 打分规则：
//! - 目标中每个长度 > 3 的关键词：标题命中 +3，描述命中 +2，频道命中 +1
//! - 命中内容类型启发式（trivia / podcast / tutorial / tech / 短视频）+5
//! - 目标含 quick / short 时：不足 5 分钟 +3，不足 10 分钟 +1

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::models::media::MAX_CATEGORY_NAME_LEN;
use crate::models::{CuratedItem, CurationResult, CurationSource, MediaItem};

/// 兜底结果最多返回的数量
pub const MAX_FALLBACK_ITEMS: usize = 10;
/// 所有条目得分为 0 时返回语料前几个
pub const ZERO_SCORE_ITEMS: usize = 5;
/// 无法从目标合成名称时的默认名称
pub const GENERIC_LABEL: &str = "Custom Playlist";

const CONTENT_TYPE_BONUS: u32 = 5;

/// 内容类型启发式：目标命中 `triggers` 时，检查条目标题/描述
struct ContentType {
    triggers: &'static [&'static str],
    title_words: &'static [&'static str],
    description_words: &'static [&'static str],
}

// 按顺序尝试，目标命中的第一组生效
const CONTENT_TYPES: &[ContentType] = &[
    ContentType {
        triggers: &["trivia", "quiz"],
        title_words: &["trivia", "quiz"],
        description_words: &["trivia", "quiz"],
    },
    ContentType {
        triggers: &["podcast", "interview"],
        title_words: &["podcast", "interview"],
        description_words: &["podcast", "interview"],
    },
    ContentType {
        triggers: &["tutorial", "learn"],
        title_words: &["tutorial", "learn", "how to"],
        description_words: &["tutorial"],
    },
    ContentType {
        triggers: &["tech", "programming"],
        title_words: &["tech", "programming", "code"],
        description_words: &["programming"],
    },
];

const SHORT_FORM_TRIGGERS: &[&str] = &["short", "quick"];
const SHORT_FORM_MAX_SECONDS: u64 = 600;

/// 带分数的条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredItem {
    pub item: MediaItem,
    pub score: u32,
    /// 在语料中的原始位置
    pub position: usize,
}

/// 兜底打分器
pub struct FallbackScorer {
    objective: String,
    keywords: Vec<String>,
    wants_short: bool,
}

impl FallbackScorer {
    pub fn new(objective: &str) -> Self {
        let objective = objective.to_lowercase();
        let keywords = extract_keywords(&objective);
        let wants_short = SHORT_FORM_TRIGGERS.iter().any(|t| objective.contains(t));
        Self {
            objective,
            keywords,
            wants_short,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// 单个条目的相关度分数
    pub fn score(&self, item: &MediaItem) -> u32 {
        let title = item.title.to_lowercase();
        let description = item.description.to_lowercase();
        let channel = item
            .channel_name
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let mut score = 0;
        for keyword in &self.keywords {
            if title.contains(keyword.as_str()) {
                score += 3;
            }
            if description.contains(keyword.as_str()) {
                score += 2;
            }
            if channel.contains(keyword.as_str()) {
                score += 1;
            }
        }

        if self.matches_content_type(&title, &description, item.duration_seconds) {
            score += CONTENT_TYPE_BONUS;
        }

        if self.wants_short && item.duration_seconds > 0 {
            if item.duration_seconds < 300 {
                score += 3;
            } else if item.duration_seconds < 600 {
                score += 1;
            }
        }

        score
    }

    fn matches_content_type(&self, title: &str, description: &str, duration: u64) -> bool {
        let triggered = CONTENT_TYPES
            .iter()
            .find(|ct| ct.triggers.iter().any(|t| self.objective.contains(t)));

        match triggered {
            Some(ct) => {
                ct.title_words.iter().any(|w| title.contains(w))
                    || ct.description_words.iter().any(|w| description.contains(w))
            }
            None if self.wants_short => duration > 0 && duration < SHORT_FORM_MAX_SECONDS,
            None => false,
        }
    }

    /// 全部条目按分数降序排列，分数相同保持语料顺序
    ///
    /// 同一 url 只保留第一次出现。
    pub fn rank(&self, items: &[MediaItem]) -> Vec<ScoredItem> {
        let mut seen = HashSet::new();
        let mut scored: Vec<ScoredItem> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| seen.insert(item.url.as_str()))
            .map(|(position, item)| ScoredItem {
                item: item.clone(),
                score: self.score(item),
                position,
            })
            .collect();
        // 稳定排序，保证同分时的语料顺序
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// 生成兜底策展结果
    ///
    /// 取分数 > 0 的前 10 个；全为 0 时取语料前 5 个。只有语料为空时结果为空。
    pub fn curate(&self, items: &[MediaItem]) -> CurationResult {
        if items.is_empty() {
            return CurationResult::empty();
        }

        let ranked = self.rank(items);
        let matched: Vec<CuratedItem> = ranked
            .iter()
            .filter(|s| s.score > 0)
            .take(MAX_FALLBACK_ITEMS)
            .map(|s| {
                CuratedItem::new(s.item.clone(), format!("Keyword relevance score {}", s.score))
            })
            .collect();

        // 全为 0 分时排序不改变语料顺序
        let (selected, reasoning) = if matched.is_empty() {
            let first: Vec<CuratedItem> = ranked
                .iter()
                .take(ZERO_SCORE_ITEMS)
                .map(|s| CuratedItem::new(s.item.clone(), "No keyword match; first in queue"))
                .collect();
            let reasoning = format!(
                "No video matched the request; showing the first {} videos",
                first.len()
            );
            (first, reasoning)
        } else {
            let reasoning = format!(
                "Keyword matching selected {} of {} videos",
                matched.len(),
                ranked.len()
            );
            (matched, reasoning)
        };

        info!(
            "🔄 兜底打分: 关键词 {:?}，选中 {} 个",
            self.keywords,
            selected.len()
        );

        CurationResult {
            label: synthesize_label(&self.objective),
            items: selected,
            reasoning,
            source: CurationSource::Fallback,
        }
    }
}

/// 长度 > 3 的关键词（去掉首尾标点）
fn extract_keywords(objective_lower: &str) -> Vec<String> {
    objective_lower
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

/// 从目标中取前 3 个有意义的词（长度 > 3），首字母大写
pub fn synthesize_label(objective: &str) -> String {
    let cleaned: String = objective
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();

    let words: Vec<String> = cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .take(3)
        .map(capitalize)
        .collect();

    if words.is_empty() {
        return GENERIC_LABEL.to_string();
    }

    let label: String = words.join(" ").chars().take(MAX_CATEGORY_NAME_LEN).collect();
    label.trim_end().to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
