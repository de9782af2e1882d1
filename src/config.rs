use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 分类能力（OpenAI 兼容接口）配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单条分类的硬超时（毫秒）
    pub classify_timeout_ms: u64,
    /// 每个批次的调用超时（毫秒）
    pub curation_timeout_ms: u64,
    pub curation_temperature: f32,
    pub curation_top_k: u32,
    pub classify_temperature: f32,
    pub classify_top_k: u32,
    /// 等待模型就绪的最长时间（毫秒）
    pub download_wait_ms: u64,
    /// 轮询模型状态的间隔（毫秒）
    pub download_poll_ms: u64,
    /// TOML 语料文件路径
    pub corpus_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            classify_timeout_ms: 15_000,
            curation_timeout_ms: 60_000,
            curation_temperature: 0.4,
            curation_top_k: 1,
            classify_temperature: 0.3,
            classify_top_k: 3,
            download_wait_ms: 300_000,
            download_poll_ms: 5_000,
            corpus_file: "corpus.toml".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            classify_timeout_ms: env_or("CLASSIFY_TIMEOUT_MS", default.classify_timeout_ms),
            curation_timeout_ms: env_or("CURATION_TIMEOUT_MS", default.curation_timeout_ms),
            curation_temperature: env_or("CURATION_TEMPERATURE", default.curation_temperature),
            curation_top_k: env_or("CURATION_TOP_K", default.curation_top_k),
            classify_temperature: env_or("CLASSIFY_TEMPERATURE", default.classify_temperature),
            classify_top_k: env_or("CLASSIFY_TOP_K", default.classify_top_k),
            download_wait_ms: env_or("DOWNLOAD_WAIT_MS", default.download_wait_ms),
            download_poll_ms: env_or("DOWNLOAD_POLL_MS", default.download_poll_ms),
            corpus_file: std::env::var("CORPUS_FILE").unwrap_or(default.corpus_file),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
        }
    }
}

/// 读取并解析环境变量，缺失时使用默认值，解析失败时记录警告并使用默认值
fn env_or<T: FromStr>(var_name: &str, default: T) -> T {
    match std::env::var(var_name) {
        Ok(value) => parse_or(var_name, &value, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(var_name: &str, value: &str, default: T) -> T {
    match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: value.to_string(),
                expected_type: std::any::type_name::<T>().to_string(),
            };
            warn!("⚠️ {}，使用默认值", err);
            default
        }
    }
}
