//! 分类能力端口 - 基础设施层
//!
//! 对外部生成式分类能力的抽象。端口实例只构造一次，通过依赖注入传给
//! 编排器和各个服务，而不是作为全局单例存在。

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CapabilityError;

/// 能力的可用状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    Unavailable,
    Downloadable,
    Downloading,
    Available,
}

/// 提示词：纯文本，或文本加一张图片
///
/// 是否带图片由调用方显式声明，端口据此协商输入类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSpec {
    Text(String),
    WithImage { text: String, image_ref: String },
}

impl PromptSpec {
    pub fn text(&self) -> &str {
        match self {
            PromptSpec::Text(text) | PromptSpec::WithImage { text, .. } => text,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        match self {
            PromptSpec::Text(_) => None,
            PromptSpec::WithImage { image_ref, .. } => Some(image_ref),
        }
    }
}

/// 单次调用的采样参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvokeOptions {
    pub temperature: f32,
    pub top_k: u32,
}

impl InvokeOptions {
    pub fn new(temperature: f32, top_k: u32) -> Self {
        Self { temperature, top_k }
    }
}

/// 分类能力端口
///
/// 每次 `invoke` 都使用一个全新的、无状态的会话，调用结束立即释放，
/// 不在调用之间复用会话。
#[async_trait]
pub trait ClassifierPort: Send + Sync {
    /// 查询当前可用状态
    async fn availability(&self) -> Availability;

    /// 发送提示词并返回原始文本
    ///
    /// 超过 `timeout_ms` 返回 `CapabilityError::Timeout`。
    async fn invoke(
        &self,
        prompt: PromptSpec,
        timeout_ms: u64,
        options: InvokeOptions,
    ) -> Result<String, CapabilityError>;
}

/// 等待模型就绪
///
/// 只在 `Downloading` 状态下按 `poll` 间隔轮询；一旦 `Available` 返回 `true`，
/// 其他状态或超过 `max_wait` 返回 `false`。
pub async fn wait_until_available(
    port: &dyn ClassifierPort,
    max_wait: Duration,
    poll: Duration,
) -> bool {
    let started = tokio::time::Instant::now();

    loop {
        match port.availability().await {
            Availability::Available => return true,
            Availability::Downloading => {
                if started.elapsed() + poll > max_wait {
                    warn!("⚠️ 等待模型下载超时 ({:?})", max_wait);
                    return false;
                }
                debug!("模型下载中，{:?} 后重试", poll);
                tokio::time::sleep(poll).await;
            }
            other => {
                info!("模型状态为 {:?}，不再等待", other);
                return false;
            }
        }
    }
}

/// 冒烟测试：问一个确定答案的问题，检查回答里是否包含 "4"
///
/// 任何失败都返回 `false`，不会报错。
pub async fn self_test(port: &dyn ClassifierPort, timeout_ms: u64) -> bool {
    if port.availability().await != Availability::Available {
        return false;
    }

    let prompt = PromptSpec::Text("What is 2+2? Respond with just the number.".to_string());
    match port
        .invoke(prompt, timeout_ms, InvokeOptions::new(0.0, 1))
        .await
    {
        Ok(response) => response.contains('4'),
        Err(e) => {
            warn!("分类能力自检失败: {}", e);
            false
        }
    }
}
