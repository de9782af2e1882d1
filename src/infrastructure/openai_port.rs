//! OpenAI 兼容接口的分类能力实现
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::capability::{Availability, ClassifierPort, InvokeOptions, PromptSpec};
use crate::config::Config;
use crate::error::CapabilityError;

/// 基于 OpenAI 兼容接口的分类能力
///
/// 职责：
/// - 只暴露"发送提示词、拿回文本"的能力
/// - 每次调用都新建客户端和请求，不在调用之间保留对话
/// - 不认识视频、分类或播放列表
pub struct OpenAiClassifierPort {
    api_key: String,
    api_base_url: String,
    model_name: String,
}

impl OpenAiClassifierPort {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.llm_api_key.clone(),
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 打开一个新会话（无状态客户端）
    fn open_session(&self) -> Client<OpenAIConfig> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&self.api_key)
            .with_api_base(&self.api_base_url);
        Client::with_config(openai_config)
    }

    fn build_request(
        &self,
        prompt: &PromptSpec,
        options: InvokeOptions,
    ) -> Result<CreateChatCompletionRequest, CapabilityError> {
        let failed = |e: OpenAIError| CapabilityError::failed(&self.model_name, e);

        // 只有显式携带图片时才使用多部分内容
        let user_msg = match prompt.image_ref() {
            Some(url) => {
                let content_parts = vec![
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText {
                            text: prompt.text().to_string(),
                        },
                    ),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.to_string(),
                                detail: Some(ImageDetail::Auto),
                            },
                        },
                    ),
                ];
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
                    .map_err(failed)?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.text())
                .build()
                .map_err(failed)?,
        };

        // OpenAI 接口没有 top_k，只传 temperature
        debug!("采样参数: temperature={}, top_k={} (忽略)", options.temperature, options.top_k);

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(options.temperature)
            .max_tokens(1024u32)
            .build()
            .map_err(failed)
    }
}

#[async_trait]
impl ClassifierPort for OpenAiClassifierPort {
    async fn availability(&self) -> Availability {
        if self.api_key.trim().is_empty() || self.model_name.trim().is_empty() {
            Availability::Unavailable
        } else {
            Availability::Available
        }
    }

    async fn invoke(
        &self,
        prompt: PromptSpec,
        timeout_ms: u64,
        options: InvokeOptions,
    ) -> Result<String, CapabilityError> {
        if self.availability().await != Availability::Available {
            return Err(CapabilityError::Unavailable);
        }

        debug!("调用分类能力，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.text().len());

        let request = self.build_request(&prompt, options)?;

        // 会话只活在这次调用里
        let session = self.open_session();
        let response = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            session.chat().create(request),
        )
        .await
        .map_err(|_| {
            warn!("分类能力调用超时 ({}ms)", timeout_ms);
            CapabilityError::Timeout { timeout_ms }
        })?
        .map_err(|e| {
            warn!("分类能力调用失败: {}", e);
            CapabilityError::failed(&self.model_name, e)
        })?;

        debug!("分类能力调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| CapabilityError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}
