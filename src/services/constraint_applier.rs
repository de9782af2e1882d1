//! 时长约束应用
//!
//! - `LessThan` / `MoreThan` / `Between`：逐条过滤
//! - `TotalDuration`：按现有相关度顺序贪心累加，第一次超出目标后停止
//!
//! 约束永远不会把非空列表变成空列表：过滤结果为空时原样返回。

use tracing::{debug, info};

use crate::models::{CuratedItem, DurationConstraint};
use crate::utils::logging::format_duration;

/// 对已策展的列表应用时长约束
pub fn apply_constraint(
    items: Vec<CuratedItem>,
    constraint: &DurationConstraint,
) -> Vec<CuratedItem> {
    if items.is_empty() {
        return items;
    }

    let filtered = match constraint {
        DurationConstraint::TotalDuration { target } => greedy_total(&items, *target),
        _ => items
            .iter()
            .filter(|c| constraint.admits(c.item.duration_seconds).unwrap_or(true))
            .cloned()
            .collect(),
    };

    info!(
        "🕒 时长约束 [{}]: {} → {}",
        constraint,
        items.len(),
        filtered.len()
    );

    if filtered.is_empty() {
        debug!("约束会清空列表，保留原始选择");
        items
    } else {
        filtered
    }
}

/// 贪心累加：放得下就放，遇到第一个放不下的就停
fn greedy_total(items: &[CuratedItem], target: u64) -> Vec<CuratedItem> {
    let mut selected = Vec::new();
    let mut total = 0u64;

    for curated in items {
        let next = total.saturating_add(curated.item.duration_seconds);
        if next > target {
            break;
        }
        total = next;
        selected.push(curated.clone());
    }

    debug!(
        "贪心选择 {} 个视频，共 {}",
        selected.len(),
        format_duration(total)
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaItem;

    fn curated(durations: &[u64]) -> Vec<CuratedItem> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| CuratedItem::new(MediaItem::new(format!("u{}", i), "v", d), "r"))
            .collect()
    }

    fn durations(items: &[CuratedItem]) -> Vec<u64> {
        items.iter().map(|c| c.item.duration_seconds).collect()
    }

    #[test]
    fn test_filter_never_empties() {
        let items = curated(&[900, 900, 900]);
        let result = apply_constraint(
            items.clone(),
            &DurationConstraint::LessThan { seconds: 600 },
        );
        assert_eq!(result, items);
    }

    #[test]
    fn test_per_item_filters() {
        let items = curated(&[120, 600, 900, 1800]);
        assert_eq!(
            durations(&apply_constraint(
                items.clone(),
                &DurationConstraint::LessThan { seconds: 600 }
            )),
            vec![120, 600]
        );
        assert_eq!(
            durations(&apply_constraint(
                items.clone(),
                &DurationConstraint::MoreThan { seconds: 900 }
            )),
            vec![900, 1800]
        );
        assert_eq!(
            durations(&apply_constraint(
                items,
                &DurationConstraint::Between { min: 500, max: 1000 }
            )),
            vec![600, 900]
        );
    }

    #[test]
    fn test_greedy_total_duration() {
        let items = curated(&[600, 900, 1200]);
        let result = apply_constraint(items, &DurationConstraint::TotalDuration { target: 1800 });
        assert_eq!(durations(&result), vec![600, 900]);
    }

    #[test]
    fn test_greedy_stops_at_first_skip() {
        // 300 本可以放进剩余空间，但第一次超出后不再尝试
        let items = curated(&[600, 1500, 300]);
        let result = apply_constraint(items, &DurationConstraint::TotalDuration { target: 1000 });
        assert_eq!(durations(&result), vec![600]);
    }

    #[test]
    fn test_greedy_keeps_original_when_first_item_too_long() {
        let items = curated(&[4000, 100]);
        let result = apply_constraint(
            items.clone(),
            &DurationConstraint::TotalDuration { target: 1800 },
        );
        assert_eq!(result, items);
    }

    #[test]
    fn test_empty_input() {
        assert!(apply_constraint(vec![], &DurationConstraint::LessThan { seconds: 1 }).is_empty());
    }
}
