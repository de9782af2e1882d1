//! 主题归一化
//!
//! 把口语化的目标压缩成 2-5 个词的检索主题。任何失败都原样返回输入。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::infrastructure::{Availability, ClassifierPort, InvokeOptions, PromptSpec};

/// 主题归一化服务
pub struct TopicNormalizer {
    port: Arc<dyn ClassifierPort>,
    timeout_ms: u64,
    options: InvokeOptions,
}

impl TopicNormalizer {
    pub fn new(port: Arc<dyn ClassifierPort>, timeout_ms: u64, options: InvokeOptions) -> Self {
        Self {
            port,
            timeout_ms,
            options,
        }
    }

    /// 归一化目标文本
    ///
    /// 结果总是单行且非空；端口不可用或调用失败时返回原文。
    pub async fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return raw.to_string();
        }

        if self.port.availability().await != Availability::Available {
            debug!("分类能力不可用，主题保持原文");
            return raw.to_string();
        }

        let prompt = PromptSpec::Text(build_normalization_prompt(raw));
        match self.port.invoke(prompt, self.timeout_ms, self.options).await {
            Ok(response) => {
                let topic = clean_topic(&response).unwrap_or_else(|| raw.to_string());
                info!("🔧 主题归一化: \"{}\" → \"{}\"", raw, topic);
                topic
            }
            Err(e) => {
                warn!("⚠️ 主题归一化失败，使用原文: {}", e);
                raw.to_string()
            }
        }
    }
}

/// 取第一行非空文本并去掉引号，结果为空时返回 `None`
fn clean_topic(response: &str) -> Option<String> {
    let line = response.lines().map(str::trim).find(|line| !line.is_empty())?;
    let cleaned: String = line
        .chars()
        .filter(|c| !matches!(*c, '"' | '\'' | '“' | '”' | '`'))
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// 构建归一化提示词
pub fn build_normalization_prompt(raw: &str) -> String {
    format!(
        r#"Turn a casual request into a short search topic.

REQUEST: "{raw}"

Return ONLY the core topic, 2-5 words.
- Drop filler such as "create a playlist", "find me", "I want".
- Drop time and duration requirements.
- Drop action words such as "watch", "learn", "see".
- Keep it simple and searchable.

Examples:
"Create a playlist for my 50-minute lunch break with trivia videos" -> trivia
"I want to learn about machine learning and AI" -> machine learning
"Find me cooking recipe videos for dinner" -> cooking recipes
"Guitar tutorials for beginners to learn" -> guitar tutorials

Topic for "{raw}":"#,
        raw = raw
    )
}
