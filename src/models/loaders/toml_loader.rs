use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::Corpus;

/// 从 TOML 文件加载语料
///
/// 文件格式：
///
/// ```toml
/// folders_ordering = ["coding", "music"]
///
/// [[folders.coding]]
/// url = "https://www.youtube.com/watch?v=abc"
/// title = "Rust in 100 seconds"
/// duration = 100
/// channel_name = "Fireship"
/// ```
pub async fn load_corpus(toml_file_path: &Path) -> AppResult<Corpus> {
    let path_display = toml_file_path.display().to_string();

    if !fs::try_exists(toml_file_path).await.unwrap_or(false) {
        return Err(FileError::NotFound { path: path_display }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_display, e))?;

    let corpus = parse_corpus(&content, &path_display)?;

    tracing::info!(
        "成功加载语料: {} 个分类, {} 个条目",
        corpus.folders.len(),
        corpus.total_items()
    );

    Ok(corpus)
}

/// 解析 TOML 文本为语料；`source_name` 仅用于错误信息
pub fn parse_corpus(content: &str, source_name: &str) -> AppResult<Corpus> {
    toml::from_str(content).map_err(|e| {
        FileError::TomlParseFailed {
            path: source_name.to_string(),
            source: e,
        }
        .into()
    })
}
