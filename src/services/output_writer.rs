//! 输出写入服务 - 业务能力层
//!
//! 只负责"把渲染好的内容落盘"，不关心内容从哪里来。
//! 先写同目录下的临时文件再重命名，目标文件要么是旧内容要么是完整的新内容。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 一个待写入的输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// 临时文件序号，保证并发任务之间不会共用临时文件
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// 输出写入服务
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputWriter;

impl OutputWriter {
    pub fn new() -> Self {
        Self
    }

    /// 写入一个文档的全部输出文件，要么全部成功，要么一个都不留
    ///
    /// 先把所有内容写入临时文件，再逐个重命名；任何一步失败都会删除
    /// 剩余的临时文件以及已经重命名到位的目标文件。
    pub async fn write_all(&self, outputs: &[OutputFile]) -> AppResult<()> {
        let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());
        for output in outputs {
            let tmp_path = temp_path_for(&output.path);
            if let Err(e) = fs::write(&tmp_path, &output.content).await {
                discard(staged.iter().map(|(tmp, _)| tmp.as_path())).await;
                let _ = fs::remove_file(&tmp_path).await;
                return Err(AppError::file_write_failed(output.path.display().to_string(), e));
            }
            staged.push((tmp_path, output.path.as_path()));
        }

        for (i, (tmp_path, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp_path, target).await {
                discard(staged[i..].iter().map(|(tmp, _)| tmp.as_path())).await;
                discard(staged[..i].iter().map(|(_, target)| *target)).await;
                return Err(AppError::file_write_failed(target.display().to_string(), e));
            }
        }

        for output in outputs {
            debug!("已写入: {} ({} 字节)", output.path.display(), output.content.len());
        }
        Ok(())
    }

    /// 原子写入单个文件
    pub async fn write(&self, path: &Path, content: &str) -> AppResult<()> {
        self.write_all(&[OutputFile::new(path, content)]).await
    }
}

/// 尽力删除，忽略错误
async fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        let _ = fs::remove_file(path).await;
    }
}

/// `dir/name.ext` → `dir/.name.ext.<pid>.<seq>.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_temp_path_is_unique_sibling() {
        let target = Path::new("out/week1.tex");
        let first = temp_path_for(target);
        let second = temp_path_for(target);
        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(Path::new("out")));
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".week1.tex."));
        assert!(name.ends_with(".tmp"));
    }

    #[tokio::test]
    async fn test_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week1_bb.txt");
        std::fs::write(&path, "old").unwrap();

        OutputWriter::new().write(&path, "new").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["week1_bb.txt"]);
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("week1.tex");

        let err = OutputWriter::new().write(&path, "x").await.unwrap_err();
        assert!(matches!(err, AppError::File(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = vec![
            OutputFile::new(dir.path().join("a.txt"), "A"),
            OutputFile::new(dir.path().join("b.tex"), "B"),
        ];
        OutputWriter::new().write_all(&outputs).await.unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("b.tex")).unwrap(), "B");
        assert_eq!(entries(dir.path()), vec!["a.txt", "b.tex"]);
    }

    #[tokio::test]
    async fn test_failed_rename_rolls_back_earlier_outputs() {
        let dir = tempfile::tempdir().unwrap();
        // 目标位置是目录，第二个文件的重命名必然失败
        std::fs::create_dir(dir.path().join("week1.tex")).unwrap();
        let outputs = vec![
            OutputFile::new(dir.path().join("week1_bb.txt"), "import"),
            OutputFile::new(dir.path().join("week1.tex"), "document"),
        ];

        let err = OutputWriter::new().write_all(&outputs).await.unwrap_err();

        assert!(matches!(err, AppError::File(_)));
        assert!(!dir.path().join("week1_bb.txt").exists());
        assert_eq!(entries(dir.path()), vec!["week1.tex"]);
    }
}
