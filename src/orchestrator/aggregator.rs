//! 结果汇总与去重
//!
//! 按提交顺序合并所有批次的选择，同一 url 只保留第一次出现。
//! 播放列表名称取提交顺序中第一个非空批次给出的名称，与完成顺序无关。

use std::collections::HashSet;

use tracing::debug;

use crate::models::{BatchOutcome, CuratedItem, CurationResult, CurationSource};

/// 汇总批次结果；没有任何选中时返回空结果
pub fn aggregate(outcomes: &[BatchOutcome]) -> CurationResult {
    let mut ordered: Vec<&BatchOutcome> = outcomes.iter().collect();
    ordered.sort_by_key(|o| o.index);

    let label = ordered
        .iter()
        .filter(|o| !o.items().is_empty())
        .find_map(|o| o.selection.as_ref().map(|s| s.label.clone()));

    let Some(label) = label else {
        debug!("所有批次均未选中视频");
        return CurationResult::empty();
    };

    let mut seen = HashSet::new();
    let items: Vec<CuratedItem> = ordered
        .iter()
        .flat_map(|o| o.items())
        .filter(|c| seen.insert(c.item.url.clone()))
        .cloned()
        .collect();

    let contributing = ordered.iter().filter(|o| !o.items().is_empty()).count();
    debug!(
        "汇总: {} 个批次中 {} 个有选中，去重后 {} 个视频",
        ordered.len(),
        contributing,
        items.len()
    );

    CurationResult {
        label,
        reasoning: format!(
            "Selected {} videos from {} batches",
            items.len(),
            ordered.len()
        ),
        items,
        source: CurationSource::Classifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchSelection, BatchStatus, MediaItem};

    fn outcome(index: usize, label: &str, urls: &[&str]) -> BatchOutcome {
        BatchOutcome {
            index,
            status: BatchStatus::Done,
            selection: Some(BatchSelection {
                label: label.to_string(),
                items: urls
                    .iter()
                    .map(|u| CuratedItem::new(MediaItem::new(*u, *u, 60), format!("from {}", index)))
                    .collect(),
                reasoning: String::new(),
            }),
        }
    }

    #[test]
    fn test_aggregate_dedups_first_wins() {
        let outcomes = vec![
            outcome(0, "Trivia", &["a", "b"]),
            outcome(1, "Quiz", &["b", "c"]),
        ];
        let result = aggregate(&outcomes);
        let urls: Vec<&str> = result.items.iter().map(|c| c.item.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert_eq!(result.items[1].reason, "from 0");
        assert_eq!(result.reasoning, "Selected 3 videos from 2 batches");
        assert_eq!(result.source, CurationSource::Classifier);
    }

    #[test]
    fn test_label_from_first_non_empty_in_submission_order() {
        // 完成顺序与提交顺序不同
        let outcomes = vec![
            outcome(2, "Third", &["z"]),
            BatchOutcome::failed(0),
            outcome(1, "Second", &["y"]),
            outcome(3, "Empty", &[]),
        ];
        let result = aggregate(&outcomes);
        assert_eq!(result.label, "Second");
        let urls: Vec<&str> = result.items.iter().map(|c| c.item.url.as_str()).collect();
        assert_eq!(urls, vec!["y", "z"]);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
        let outcomes = vec![BatchOutcome::failed(0), outcome(1, "Nothing", &[])];
        let result = aggregate(&outcomes);
        assert!(result.is_empty());
        assert_eq!(result.source, CurationSource::Empty);
    }
}
