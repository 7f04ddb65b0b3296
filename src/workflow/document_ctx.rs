//! 文档处理上下文
//!
//! 封装"我正在处理第几个文档、它在哪里"这一信息

use std::fmt::Display;
use std::path::PathBuf;

/// 文档处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 文档序号（从 1 开始，仅用于日志显示）
    pub document_index: usize,

    /// 输入文件路径
    pub source: PathBuf,
}

impl DocumentCtx {
    pub fn new(document_index: usize, source: impl Into<PathBuf>) -> Self {
        Self {
            document_index,
            source: source.into(),
        }
    }

    /// 输入文件名（日志中使用）
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {}]", self.document_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_file_name() {
        let ctx = DocumentCtx::new(3, "quizzes/week3.txt");
        assert_eq!(ctx.to_string(), "[文档 3]");
        assert_eq!(ctx.file_name(), "week3.txt");
    }
}
