//! 策展运行状态
//!
//! 一次运行只有两条路径，两条都以 `Done` 结束：
//!
//! ```text
//! Idle → TopicNormalizing → BatchDispatch → Aggregating → ConstraintFiltering → Done
//! Idle → FallbackScoring → Done
//! ```
//!
//! 策展路径没有选中任何视频时，`Aggregating` 之后转入 `FallbackScoring`。

use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    TopicNormalizing,
    BatchDispatch,
    Aggregating,
    ConstraintFiltering,
    FallbackScoring,
    Done,
}

impl RunState {
    /// 是否允许从当前状态转到 `next`
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, TopicNormalizing)
                | (Idle, FallbackScoring)
                | (Idle, Done)
                | (TopicNormalizing, BatchDispatch)
                | (BatchDispatch, Aggregating)
                | (Aggregating, ConstraintFiltering)
                | (Aggregating, FallbackScoring)
                | (ConstraintFiltering, Done)
                | (FallbackScoring, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == RunState::Done
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Idle => "空闲",
            RunState::TopicNormalizing => "主题归一化",
            RunState::BatchDispatch => "批次调度",
            RunState::Aggregating => "结果汇总",
            RunState::ConstraintFiltering => "时长约束",
            RunState::FallbackScoring => "兜底打分",
            RunState::Done => "完成",
        };
        f.write_str(name)
    }
}

/// 记录一次运行经过的状态
#[derive(Debug, Clone)]
pub struct RunTrace {
    current: RunState,
    history: Vec<RunState>,
}

impl RunTrace {
    pub fn new() -> Self {
        Self {
            current: RunState::Idle,
            history: vec![RunState::Idle],
        }
    }

    pub fn current(&self) -> RunState {
        self.current
    }

    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// 推进到下一个状态；非法转移只记录日志，不中断运行
    pub fn advance(&mut self, next: RunState) {
        if !self.current.can_transition_to(next) {
            tracing::error!("非法状态转移: {} → {}", self.current, next);
        }
        tracing::debug!("状态: {} → {}", self.current, next);
        self.current = next;
        self.history.push(next);
    }
}

impl Default for RunTrace {
    fn default() -> Self {
        Self::new()
    }
}
