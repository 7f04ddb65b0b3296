use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个待转换的题目文档
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
}

/// 读取单个题目文档
///
/// Windows 换行统一为 `\n`
pub async fn load_document(path: &Path) -> AppResult<SourceDocument> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    tracing::debug!(
        "已读取: {} ({} 字节)",
        path.file_name().unwrap_or_default().to_string_lossy(),
        text.len()
    );

    Ok(SourceDocument {
        path: path.to_path_buf(),
        text: text.replace("\r\n", "\n"),
    })
}
