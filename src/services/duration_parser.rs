//! 时长约束解析
//!
//! 纯函数：文本 → 约束。必须对**原始**目标文本运行，因为主题归一化
//! 恰好会去掉这些时长短语。
//!
//! 匹配优先级（先匹配者胜）：
//! 1. `less than|under|below|shorter than|max|maximum N 单位` → `LessThan`
//! 2. `more than|over|above|longer than|min|minimum|at least N 单位` → `MoreThan`
//! 3. `between N and|to|- M 单位` → `Between`（闭区间）
//! 4. `N 单位`（可跟 `playlist|lunch|break|of content`）→ `TotalDuration`
//! 5. 单词 `quick` / `short` → `LessThan(600)`
//! 6. 单词 `long` → `MoreThan(1200)`
//!
//! 注意：第 4 条会误伤与时长无关的数字短语（例如 "a 2 hour drive video"），
//! 这里保留该行为。

use std::sync::LazyLock;

use regex::Regex;

use crate::models::DurationConstraint;

const UNIT: &str = r"(minute|min|hour|hr)";

static LESS_THAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:less than|under|below|shorter than|max|maximum)\s+(\d+)\s*{}",
        UNIT
    ))
    .expect("静态正则")
});

static MORE_THAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:more than|over|above|longer than|min|minimum|at least)\s+(\d+)\s*{}",
        UNIT
    ))
    .expect("静态正则")
});

static BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bbetween\s+(\d+)\s*(?:and|to|-)\s*(\d+)\s*{}",
        UNIT
    ))
    .expect("静态正则")
});

static TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(\d+)[\s-]*{}(?:\s+playlist|\s+lunch|\s+break|\s+of content)?",
        UNIT
    ))
    .expect("静态正则")
});

static QUICK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:quick|short)\b").expect("静态正则"));

static LONG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\blong\b").expect("静态正则"));

/// `quick` / `short` 对应的单视频上限
pub const QUICK_MAX_SECONDS: u64 = 600;
/// `long` 对应的单视频下限
pub const LONG_MIN_SECONDS: u64 = 1200;

/// 从目标文本中解析时长约束，没有匹配返回 `None`
pub fn parse_duration_constraint(text: &str) -> Option<DurationConstraint> {
    let lower = text.to_lowercase();

    if let Some(seconds) = LESS_THAN.captures(&lower).and_then(|c| to_seconds(&c[1], &c[2])) {
        return Some(DurationConstraint::LessThan { seconds });
    }

    if let Some(seconds) = MORE_THAN.captures(&lower).and_then(|c| to_seconds(&c[1], &c[2])) {
        return Some(DurationConstraint::MoreThan { seconds });
    }

    if let Some(caps) = BETWEEN.captures(&lower) {
        if let (Some(a), Some(b)) = (to_seconds(&caps[1], &caps[3]), to_seconds(&caps[2], &caps[3]))
        {
            return Some(DurationConstraint::Between {
                min: a.min(b),
                max: a.max(b),
            });
        }
    }

    if let Some(target) = TOTAL.captures(&lower).and_then(|c| to_seconds(&c[1], &c[2])) {
        return Some(DurationConstraint::TotalDuration { target });
    }

    if QUICK.is_match(&lower) {
        return Some(DurationConstraint::LessThan {
            seconds: QUICK_MAX_SECONDS,
        });
    }

    if LONG.is_match(&lower) {
        return Some(DurationConstraint::MoreThan {
            seconds: LONG_MIN_SECONDS,
        });
    }

    None
}

/// `hour|hr` 乘 3600，`minute|min` 乘 60；数字溢出时返回 `None`
fn to_seconds(value: &str, unit: &str) -> Option<u64> {
    let value: u64 = value.parse().ok()?;
    let multiplier = if unit.starts_with('h') { 3600 } else { 60 };
    value.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<DurationConstraint> {
        parse_duration_constraint(text)
    }

    #[test]
    fn test_less_than_variants() {
        assert_eq!(
            parse("videos under 10 minutes"),
            Some(DurationConstraint::LessThan { seconds: 600 })
        );
        assert_eq!(
            parse("Shorter than 1 hour please"),
            Some(DurationConstraint::LessThan { seconds: 3600 })
        );
        assert_eq!(
            parse("maximum 15 min cooking"),
            Some(DurationConstraint::LessThan { seconds: 900 })
        );
    }

    #[test]
    fn test_more_than_variants() {
        assert_eq!(
            parse("at least 20 minutes of jazz"),
            Some(DurationConstraint::MoreThan { seconds: 1200 })
        );
        assert_eq!(
            parse("podcasts over 2 hrs"),
            Some(DurationConstraint::MoreThan { seconds: 7200 })
        );
    }

    #[test]
    fn test_between() {
        assert_eq!(
            parse("talks between 5 and 15 minutes"),
            Some(DurationConstraint::Between { min: 300, max: 900 })
        );
        assert_eq!(
            parse("between 20-10 min"),
            Some(DurationConstraint::Between { min: 600, max: 1200 })
        );
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(
            parse("30 minute lunch trivia"),
            Some(DurationConstraint::TotalDuration { target: 1800 })
        );
        assert_eq!(
            parse("a 2-hour playlist of lectures"),
            Some(DurationConstraint::TotalDuration { target: 7200 })
        );
    }

    #[test]
    fn test_less_than_wins_over_total() {
        assert_eq!(
            parse("45 minute break, each under 10 minutes"),
            Some(DurationConstraint::LessThan { seconds: 600 })
        );
    }

    #[test]
    fn test_total_duration_misfires_on_unrelated_numbers() {
        // 已知行为：无关的 "2 hour" 也会被当作总时长
        assert_eq!(
            parse("a 2 hour drive video"),
            Some(DurationConstraint::TotalDuration { target: 7200 })
        );
    }

    #[test]
    fn test_bare_words() {
        assert_eq!(
            parse("quick tutorial"),
            Some(DurationConstraint::LessThan { seconds: 600 })
        );
        assert_eq!(
            parse("Something SHORT and funny"),
            Some(DurationConstraint::LessThan { seconds: 600 })
        );
        assert_eq!(
            parse("long documentaries"),
            Some(DurationConstraint::MoreThan { seconds: 1200 })
        );
        assert_eq!(parse("longboard tricks"), None);
    }

    #[test]
    fn test_no_constraint() {
        assert_eq!(parse("machine learning"), None);
        assert_eq!(parse(""), None);
    }
}
