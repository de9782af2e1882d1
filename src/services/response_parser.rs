//! 模型响应解析
//!
//! 模型的回答在收到后立即解析并校验，之后只流转强类型结果。

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::ResponseError;
use crate::models::{BatchSelection, CuratedItem, MediaItem};
use crate::utils::logging::truncate_text;

/// 模型未给出单条理由时使用
pub const DEFAULT_REASON: &str = "Matches search criteria";

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("静态正则"));

/// 策展响应的 JSON 结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurationReply {
    #[serde(default)]
    folder_name: Option<String>,
    #[serde(default)]
    video_indices: Option<Vec<JsonValue>>,
    // 以下两项只影响展示，类型不对时忽略
    #[serde(default)]
    reasoning: Option<JsonValue>,
    #[serde(default)]
    video_reasons: Option<JsonValue>,
}

/// 解析一个批次的策展响应
///
/// 序号只在本批内有效，越界或非整数的序号被静默丢弃，重复序号只保留一次。
///
/// # 返回
/// - `Ok(selection)`：结构合法（`selection.items` 可能为空）
/// - `Err(ResponseError)`：没有 JSON、JSON 非法或缺少必需字段
pub fn parse_curation_reply(
    response: &str,
    batch: &[MediaItem],
) -> Result<BatchSelection, ResponseError> {
    let json_text = JSON_OBJECT
        .find(response)
        .map(|m| m.as_str())
        .ok_or_else(|| ResponseError::NoJson {
            response: truncate_text(response, 200),
        })?;

    let reply: CurationReply = serde_json::from_str(json_text)?;

    let label = reply
        .folder_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ResponseError::SchemaViolation {
            reason: "缺少 folderName".to_string(),
        })?;

    let indices = reply
        .video_indices
        .ok_or_else(|| ResponseError::SchemaViolation {
            reason: "缺少 videoIndices 数组".to_string(),
        })?;

    let mut seen = HashSet::new();
    let items: Vec<CuratedItem> = indices
        .iter()
        .filter_map(as_index)
        .filter(|&index| index < batch.len())
        .filter(|&index| seen.insert(index))
        .map(|index| {
            let reason = reply
                .video_reasons
                .as_ref()
                .and_then(|reasons| reasons.get(index.to_string()))
                .and_then(JsonValue::as_str)
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_REASON);
            CuratedItem::new(batch[index].clone(), reason)
        })
        .collect();

    debug!(
        "解析成功: folderName={}, 选中 {}/{}",
        label,
        items.len(),
        indices.len()
    );

    Ok(BatchSelection {
        label,
        items,
        reasoning: reply
            .reasoning
            .as_ref()
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// 序号可能是数字，也可能是数字字符串
fn as_index(value: &JsonValue) -> Option<usize> {
    match value {
        JsonValue::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
