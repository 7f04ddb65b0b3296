//! 单个文档处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **读取输入**：加载单个题目文档
//! 2. **流程调度**：委托 `DocumentFlow` 在内存中完成转换
//! 3. **写入输出**：渲染全部成功后才原子写入各输出文件
//! 4. **记录报告**：成功或失败都向运行报告追加一行
//!
//! 文档级别的错误在这里被捕获，不会影响同一批次的其他文档。

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info};

use crate::models::load_document;
use crate::services::{DocumentOutcome, OutputFile, OutputWriter, ReportWriter};
use crate::workflow::{DocumentCtx, DocumentFlow, OutputMode, RenderedDocument};

/// 导入文件的默认后缀
const IMPORT_SUFFIX: &str = "_bb.txt";
/// LaTeX 文档的扩展名
const DOCUMENT_EXTENSION: &str = "tex";

/// 一个文档的输出路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTargets {
    pub import: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

impl OutputTargets {
    /// 计算输出路径
    ///
    /// - 未指定 `-o`：与输入文件同目录，`<stem>_bb.txt` / `<stem>.tex`
    /// - 指定 `-o` 且只生成一种输出：直接使用该路径
    /// - 指定 `-o` 且生成两种输出：以该路径的文件名（不含扩展名）为基础
    pub fn resolve(source: &Path, explicit: Option<&Path>, mode: OutputMode) -> Self {
        let base = explicit.unwrap_or(source);
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let import_path = base.with_file_name(format!("{}{}", stem, IMPORT_SUFFIX));
        let document_path = base.with_extension(DOCUMENT_EXTENSION);

        match (explicit, mode) {
            (Some(path), OutputMode::Import) => Self {
                import: Some(path.to_path_buf()),
                document: None,
            },
            (Some(path), OutputMode::Document) => Self {
                import: None,
                document: Some(path.to_path_buf()),
            },
            _ => Self {
                import: mode.wants_import().then_some(import_path),
                document: mode.wants_document().then_some(document_path),
            },
        }
    }

    /// 所有将要写入的路径
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.import.iter().chain(self.document.iter())
    }

    /// 与渲染结果配对，得到待写入的文件列表
    fn pair(&self, rendered: RenderedDocument) -> Vec<OutputFile> {
        let mut outputs = Vec::new();
        if let (Some(path), Some(content)) = (&self.import, rendered.import) {
            outputs.push(OutputFile::new(path, content));
        }
        if let (Some(path), Some(content)) = (&self.document, rendered.document) {
            outputs.push(OutputFile::new(path, content));
        }
        outputs
    }
}

/// 处理单个文档
///
/// # 参数
/// - `flow`: 文档转换流程
/// - `report`: 运行报告
/// - `ctx`: 文档上下文
/// - `explicit_output`: 命令行 `-o` 指定的输出路径
///
/// # 返回
/// 返回文档是否转换成功；只有写报告失败时才返回错误
pub async fn process_document(
    flow: &DocumentFlow,
    report: &ReportWriter,
    ctx: &DocumentCtx,
    explicit_output: Option<&Path>,
) -> Result<bool> {
    info!("{} 📄 开始处理: {}", ctx, ctx.file_name());

    let source = ctx.source.display().to_string();
    match convert(flow, ctx, explicit_output).await {
        Ok((questions, written)) => {
            let outputs: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
            info!("{} ✅ 已生成: {}", ctx, outputs.join(", "));
            report
                .write(
                    ctx.document_index,
                    &source,
                    &DocumentOutcome::Converted { questions, outputs },
                )
                .await?;
            Ok(true)
        }
        Err(e) => {
            let reason = e.to_string();
            error!("{} ❌ 转换失败: {}", ctx, reason);
            report
                .write(ctx.document_index, &source, &DocumentOutcome::Failed { reason })
                .await?;
            Ok(false)
        }
    }
}

/// 读取 → 转换 → 写入，返回题目数量与已写入的路径
async fn convert(
    flow: &DocumentFlow,
    ctx: &DocumentCtx,
    explicit_output: Option<&Path>,
) -> Result<(usize, Vec<PathBuf>)> {
    let document = load_document(&ctx.source).await?;

    let rendered = flow.run(&document.text, ctx)?;
    let questions = rendered.question_count;

    let targets = OutputTargets::resolve(&ctx.source, explicit_output, flow.mode());
    let outputs = targets.pair(rendered);

    OutputWriter::new().write_all(&outputs).await?;

    Ok((questions, outputs.into_iter().map(|o| o.path).collect()))
}
