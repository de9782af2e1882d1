use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 分类能力（Port）错误
    #[error("分类能力错误: {0}")]
    Capability(#[from] CapabilityError),
    /// 模型响应解析错误
    #[error("响应解析错误: {0}")]
    Response(#[from] ResponseError),
    /// 校验错误
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 分类能力错误
///
/// 调用方必须把任何一种都当作"降级信号"，而不是致命错误。
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// 能力不可用（未配置或模型未就绪）
    #[error("分类能力不可用")]
    Unavailable,
    /// 调用超时
    #[error("调用超时 ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },
    /// 调用失败
    #[error("调用失败 (模型: {model}): {source}")]
    Failed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyResponse { model: String },
}

/// 响应解析错误（非 JSON 或不符合约定结构）
#[derive(Debug, Error)]
pub enum ResponseError {
    /// 响应中没有 JSON 对象
    #[error("响应中未找到 JSON: {response}")]
    NoJson { response: String },
    /// JSON 格式错误
    #[error("JSON 解析失败: {source}")]
    Malformed {
        #[from]
        source: serde_json::Error,
    },
    /// JSON 结构不符合约定
    #[error("响应结构不符合约定: {reason}")]
    SchemaViolation { reason: String },
}

/// 校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 标签不在允许的分类集合中
    #[error("标签 '{label}' 不在允许的分类集合中")]
    LabelNotAllowed { label: String },
    /// 分类名称不合法
    #[error("分类名称 '{name}' 不合法: {reason}")]
    InvalidCategoryName { name: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建分类能力调用失败错误
    pub fn capability_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Capability(CapabilityError::failed(model, source))
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

impl CapabilityError {
    /// 创建调用失败错误
    pub fn failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CapabilityError::Failed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_display() {
        let err: AppError = CapabilityError::Timeout { timeout_ms: 15000 }.into();
        assert_eq!(err.to_string(), "分类能力错误: 调用超时 (15000ms)");

        let err: AppError = ValidationError::LabelNotAllowed {
            label: "cooking".to_string(),
        }
        .into();
        assert!(err.to_string().contains("cooking"));
    }

    #[test]
    fn test_capability_failed_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = AppError::capability_failed("gpt-4o-mini", io);
        let source = std::error::Error::source(&err).expect("应有 source");
        assert!(source.to_string().contains("connection reset"));
    }
}
