use std::fmt::Display;

use serde::Serialize;

/// 从目标文本中解析出的时长约束（单位：秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DurationConstraint {
    /// 每个视频不超过给定时长
    LessThan { seconds: u64 },
    /// 每个视频不少于给定时长
    MoreThan { seconds: u64 },
    /// 每个视频时长在闭区间内
    Between { min: u64, max: u64 },
    /// 整个播放列表的总时长上限
    TotalDuration { target: u64 },
}

impl DurationConstraint {
    /// 单条目谓词；`TotalDuration` 不是逐条过滤，恒为 `None`
    pub fn admits(&self, duration_seconds: u64) -> Option<bool> {
        match *self {
            DurationConstraint::LessThan { seconds } => Some(duration_seconds <= seconds),
            DurationConstraint::MoreThan { seconds } => Some(duration_seconds >= seconds),
            DurationConstraint::Between { min, max } => {
                Some(duration_seconds >= min && duration_seconds <= max)
            }
            DurationConstraint::TotalDuration { .. } => None,
        }
    }
}

impl Display for DurationConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationConstraint::LessThan { seconds } => write!(f, "每个视频 ≤ {}s", seconds),
            DurationConstraint::MoreThan { seconds } => write!(f, "每个视频 ≥ {}s", seconds),
            DurationConstraint::Between { min, max } => {
                write!(f, "每个视频在 {}s-{}s 之间", min, max)
            }
            DurationConstraint::TotalDuration { target } => write!(f, "总时长 ≤ {}s", target),
        }
    }
}

/// 用户目标：原始文本、归一化主题、时长约束
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub raw: String,
    pub topic: String,
    pub constraint: Option<DurationConstraint>,
}

impl Objective {
    /// 从原始文本创建，主题暂等于原文，约束从原文解析
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let constraint = crate::services::duration_parser::parse_duration_constraint(&raw);
        Self {
            topic: raw.clone(),
            raw,
            constraint,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_bounds_are_inclusive() {
        let c = DurationConstraint::Between { min: 300, max: 600 };
        assert_eq!(c.admits(300), Some(true));
        assert_eq!(c.admits(600), Some(true));
        assert_eq!(c.admits(601), Some(false));
        assert_eq!(DurationConstraint::LessThan { seconds: 600 }.admits(600), Some(true));
        assert_eq!(DurationConstraint::TotalDuration { target: 1800 }.admits(10), None);
    }

    #[test]
    fn test_objective_parses_constraint_from_raw_text() {
        let objective = Objective::new("30 minute lunch trivia").with_topic("trivia");
        assert_eq!(objective.topic, "trivia");
        assert_eq!(
            objective.constraint,
            Some(DurationConstraint::TotalDuration { target: 1800 })
        );
    }
}
