//! 运行报告写入服务 - 业务能力层
//!
//! 只负责向报告文件追加一行，不关心流程

use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 单个文档的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// 转换成功
    Converted {
        questions: usize,
        outputs: Vec<String>,
    },
    /// 转换失败，不写任何输出
    Failed { reason: String },
}

/// 报告写入服务
///
/// - 每个文档写一行
/// - 只追加，不覆盖
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    /// 追加一个文档的处理结果
    ///
    /// # 参数
    /// - `document_index`: 文档序号（从 1 开始）
    /// - `source`: 输入文件路径
    /// - `outcome`: 处理结果
    pub async fn write(
        &self,
        document_index: usize,
        source: &str,
        outcome: &DocumentOutcome,
    ) -> Result<()> {
        debug!("写入报告: 文档 {} | {}", document_index, source);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)
            .await
            .with_context(|| format!("无法打开报告文件: {}", self.report_file_path))?;

        file.write_all(format_line(document_index, source, outcome).as_bytes())
            .await?;
        file.flush().await?;

        Ok(())
    }
}

fn format_line(document_index: usize, source: &str, outcome: &DocumentOutcome) -> String {
    match outcome {
        DocumentOutcome::Converted { questions, outputs } => format!(
            "文档 {} | {} | 成功 | 题目 {} | 输出: {}\n",
            document_index,
            source,
            questions,
            outputs.join(", ")
        ),
        DocumentOutcome::Failed { reason } => format!(
            "文档 {} | {} | 失败 | {}\n",
            document_index, source, reason
        ),
    }
}
