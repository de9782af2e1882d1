//! 单条视频分类
//!
//! 根据语料中已有的分类（及其示例条目）为一个视频选择分类。模型的回答
//! 不被信任：先归一化，再与允许集合匹配，匹配不上就回到默认分类。
//! 因此返回值永远是允许集合中的成员。

use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ValidationError;
use crate::infrastructure::{Availability, ClassifierPort, InvokeOptions, PromptSpec};
use crate::models::{Corpus, DEFAULT_CATEGORY};
use crate::services::prompt_compiler::{
    compile_single_item_prompt, SingleItemRequest, THUMBNAIL_PROMPT,
};

/// 缩略图描述失败时的占位文本
pub const NO_THUMBNAIL_DESCRIPTION: &str = "No description available";

/// 已校验的分类名，保证属于允许集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification(String);

impl Classification {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 把模型的原始回答解析为允许集合中的分类
///
/// 1. 去空白、转小写、去掉首尾引号
/// 2. 与允许集合做大小写无关的精确匹配
/// 3. 任一方向的子串包含
///
/// 都匹配不上时返回 `LabelNotAllowed`。
pub fn resolve_label(raw: &str, allowed: &[String]) -> Result<Classification, ValidationError> {
    let normalized = normalize_label(raw);
    let not_allowed = || ValidationError::LabelNotAllowed {
        label: raw.trim().to_string(),
    };

    if normalized.is_empty() {
        return Err(not_allowed());
    }

    if let Some(exact) = allowed
        .iter()
        .find(|name| name.to_lowercase() == normalized)
    {
        return Ok(Classification(exact.clone()));
    }

    allowed
        .iter()
        .find(|name| {
            let name = name.to_lowercase();
            !name.is_empty() && (name.contains(&normalized) || normalized.contains(&name))
        })
        .map(|name| Classification(name.clone()))
        .ok_or_else(not_allowed)
}

/// 与 [`resolve_label`] 相同，但匹配失败时返回默认分类
pub fn validate_label(raw: &str, allowed: &[String]) -> Classification {
    resolve_label(raw, allowed).unwrap_or_else(|e| {
        debug!("{}，使用默认分类 {}", e, DEFAULT_CATEGORY);
        Classification(DEFAULT_CATEGORY.to_string())
    })
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '“' | '”'))
        .trim()
        .to_string()
}

/// 单条分类服务
pub struct FolderClassifier {
    port: Arc<dyn ClassifierPort>,
    timeout_ms: u64,
    options: InvokeOptions,
}

impl FolderClassifier {
    pub fn new(port: Arc<dyn ClassifierPort>, timeout_ms: u64, options: InvokeOptions) -> Self {
        Self {
            port,
            timeout_ms,
            options,
        }
    }

    /// 为一个视频选择分类
    ///
    /// 能力不可用、超时、调用失败或回答不在允许集合内，都会得到默认分类。
    /// 不重试。
    ///
    /// 整个调用共用 `timeout_ms`：缩略图描述最多占一半，分类使用剩余时间。
    pub async fn classify(&self, request: &SingleItemRequest, corpus: &Corpus) -> Classification {
        let allowed = corpus.allowed_categories();

        if self.port.availability().await != Availability::Available {
            warn!("⚠️ 分类能力不可用，\"{}\" 归入默认分类", request.title);
            return Classification(DEFAULT_CATEGORY.to_string());
        }

        let started = Instant::now();
        let thumbnail_description = match &request.thumbnail {
            Some(image_ref) => {
                Some(self.describe_thumbnail(image_ref, self.timeout_ms / 2).await)
            }
            None => None,
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let remaining_ms = self.timeout_ms.saturating_sub(elapsed_ms).max(1);

        let prompt = compile_single_item_prompt(
            request,
            &corpus.categories(),
            &allowed,
            thumbnail_description.as_deref(),
        );

        match self
            .port
            .invoke(PromptSpec::Text(prompt), remaining_ms, self.options)
            .await
        {
            Ok(raw) => {
                let classification = validate_label(&raw, &allowed);
                info!(
                    "📁 \"{}\" → {} (模型回答: {})",
                    request.title,
                    classification,
                    raw.trim()
                );
                classification
            }
            Err(e) => {
                warn!("⚠️ 分类失败，\"{}\" 归入默认分类: {}", request.title, e);
                Classification(DEFAULT_CATEGORY.to_string())
            }
        }
    }

    /// 请求 1-2 句缩略图描述，任何失败都返回占位文本
    pub async fn describe_thumbnail(&self, image_ref: &str, timeout_ms: u64) -> String {
        let prompt = PromptSpec::WithImage {
            text: THUMBNAIL_PROMPT.to_string(),
            image_ref: image_ref.to_string(),
        };

        match self.port.invoke(prompt, timeout_ms, self.options).await {
            Ok(description) if !description.trim().is_empty() => {
                debug!("缩略图描述: {}", description.trim());
                description.trim().to_string()
            }
            Ok(_) => NO_THUMBNAIL_DESCRIPTION.to_string(),
            Err(e) => {
                warn!("⚠️ 缩略图描述失败: {}", e);
                NO_THUMBNAIL_DESCRIPTION.to_string()
            }
        }
    }
}
