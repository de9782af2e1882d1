use serde::Serialize;

use super::media::MediaItem;

/// 每批最多包含的视频数量
pub const BATCH_SIZE: usize = 10;

/// 选中的视频及选中理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuratedItem {
    pub item: MediaItem,
    pub reason: String,
}

impl CuratedItem {
    pub fn new(item: MediaItem, reason: impl Into<String>) -> Self {
        Self {
            item,
            reason: reason.into(),
        }
    }
}

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationSource {
    /// 生成式分类器
    Classifier,
    /// 兜底关键词打分
    Fallback,
    /// 语料为空
    Empty,
}

/// 一次策展的结果
///
/// 不变量：`items` 中不存在两个 url 相同的条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurationResult {
    pub label: String,
    pub items: Vec<CuratedItem>,
    pub reasoning: String,
    pub source: CurationSource,
}

impl CurationResult {
    /// 明确的空结果（不是错误）
    pub fn empty() -> Self {
        Self {
            label: String::new(),
            items: Vec::new(),
            reasoning: "No items selected".to_string(),
            source: CurationSource::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.items.iter().map(|c| c.item.duration_seconds).sum()
    }
}

/// 批次状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStatus {
    Done,
    Failed,
}

/// 一个批次：语料中连续的一段（最多 10 个）
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// 提交顺序（从 0 开始）
    pub index: usize,
    pub items: Vec<MediaItem>,
}

/// 单个批次被模型选中的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSelection {
    pub label: String,
    pub items: Vec<CuratedItem>,
    pub reasoning: String,
}

/// 批次结算后的结果；失败的批次 `selection` 为 `None`
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub index: usize,
    pub status: BatchStatus,
    pub selection: Option<BatchSelection>,
}

impl BatchOutcome {
    pub fn failed(index: usize) -> Self {
        Self {
            index,
            status: BatchStatus::Failed,
            selection: None,
        }
    }

    /// 本批选中的条目（失败时为空）
    pub fn items(&self) -> &[CuratedItem] {
        self.selection
            .as_ref()
            .map(|s| s.items.as_slice())
            .unwrap_or(&[])
    }
}

/// 批次完成事件，按到达顺序（而非提交顺序）发出
#[derive(Debug, Clone, Serialize)]
pub struct BatchCompleted {
    /// 批次序号（从 1 开始）
    pub batch_index: usize,
    pub total_batches: usize,
    pub new_items: Vec<CuratedItem>,
    pub label: Option<String>,
    pub status: BatchStatus,
}
