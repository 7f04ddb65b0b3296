//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文档的调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验参数、创建运行报告、构造转换流程
//! 2. **并发控制**：使用 Semaphore 限制并发数量
//! 3. **分批处理**：将文档分批次处理，每批完成后再开始下一批
//! 4. **失败隔离**：一个文档失败不影响其他文档
//! 5. **全局统计**：汇总所有文档的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文档的细节
//! - **并发安全**：每个文档由一个 tokio 任务独占
//! - **向下委托**：委托 document_processor 处理单个文档

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::orchestrator::document_processor::{self, OutputTargets};
use crate::services::ReportWriter;
use crate::utils::logging::{
    init_report_file, log_batch_complete, log_batch_start, log_documents_loaded, log_startup,
    print_final_stats,
};
use crate::workflow::{DocumentCtx, DocumentFlow, OutputMode};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<DocumentFlow>,
    report: Arc<ReportWriter>,
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
}

impl App {
    /// 初始化应用
    ///
    /// `output` 只能在恰好一个输入文件时使用
    pub fn initialize(
        config: Config,
        mode: OutputMode,
        inputs: Vec<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Self> {
        if output.is_some() && inputs.len() != 1 {
            return Err(ConfigError::InvalidArguments(format!(
                "-o/--output 只能在恰好一个输入文件时使用 (实际: {} 个)",
                inputs.len()
            ))
            .into());
        }
        if config.max_concurrent_documents == 0 {
            return Err(ConfigError::InvalidArguments("最大并发数必须大于 0".to_string()).into());
        }

        // 同名不同扩展名的输入（或重复的输入）会写到同一个输出文件
        let mut targets = HashSet::new();
        for input in &inputs {
            let resolved = OutputTargets::resolve(input, output.as_deref(), mode);
            for path in resolved.paths() {
                if !targets.insert(path.clone()) {
                    return Err(ConfigError::InvalidArguments(format!(
                        "多个输入文件写入同一个输出: {}",
                        path.display()
                    ))
                    .into());
                }
            }
        }

        init_report_file(&config.report_file)
            .with_context(|| format!("无法创建报告文件: {}", config.report_file))?;

        log_startup(mode.as_str(), config.max_concurrent_documents, config.randomize);

        let flow = DocumentFlow::new(&config, mode)?;
        let report = ReportWriter::with_path(config.report_file.clone());

        Ok(Self {
            config,
            flow: Arc::new(flow),
            report: Arc::new(report),
            inputs,
            output,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunStats> {
        if self.inputs.is_empty() {
            warn!("⚠️ 没有待处理的文档，程序结束");
            return Ok(RunStats::default());
        }

        log_documents_loaded(self.inputs.len(), self.config.max_concurrent_documents);

        let stats = self.process_all_documents().await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.report_file,
        );

        Ok(stats)
    }

    /// 处理所有文档
    async fn process_all_documents(&self) -> Result<RunStats> {
        let max_concurrent = self.config.max_concurrent_documents;
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total = self.inputs.len();
        let total_batches = total.div_ceil(max_concurrent);
        let mut stats = RunStats {
            total,
            ..Default::default()
        };

        for batch_start in (0..total).step_by(max_concurrent) {
            let batch_end = (batch_start + max_concurrent).min(total);
            let batch_num = batch_start / max_concurrent + 1;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            let batch_result = self
                .process_batch(&self.inputs[batch_start..batch_end], batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_inputs: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        for (idx, input) in batch_inputs.iter().enumerate() {
            let document_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.flow.clone();
            let report = self.report.clone();
            let output = self.output.clone();
            let ctx = DocumentCtx::new(document_index, input.clone());

            let handle = tokio::spawn(async move {
                let _permit = permit;
                document_processor::process_document(&flow, &report, &ctx, output.as_deref())
                    .await
            });
            batch_handles.push((document_index, handle));
        }

        let mut result = BatchResult::default();

        for (document_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(true)) => result.success += 1,
                Ok(Ok(false)) => result.failed += 1,
                Ok(Err(e)) => {
                    error!("[文档 {}] ❌ 写入报告失败: {:#}", document_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", document_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl RunStats {
    /// 所有文档都转换成功
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.success == self.total
    }
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            report_file: dir.join("report.txt").display().to_string(),
            max_concurrent_documents: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_output_requires_single_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = App::initialize(
            config_in(dir.path()),
            OutputMode::Both,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
            Some(PathBuf::from("out.txt")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_same_stem_inputs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![dir.path().join("week1.txt"), dir.path().join("week1.md")];

        let err = App::initialize(config_in(dir.path()), OutputMode::Both, inputs, None)
            .err()
            .unwrap();
        let err = err.downcast::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::InvalidArguments(ref m) if m.contains("week1_bb.txt")));
    }

    #[test]
    fn test_repeated_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("week1.txt");

        let result = App::initialize(
            config_in(dir.path()),
            OutputMode::Document,
            vec![input.clone(), input],
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_distinct_stems_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![dir.path().join("week1.txt"), dir.path().join("week2.txt")];
        assert!(App::initialize(config_in(dir.path()), OutputMode::Both, inputs, None).is_ok());
    }

    #[tokio::test]
    async fn test_batches_isolate_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = "-------\ntype: FIL\nprompt: Upload your essay\n";
        let bad = "-------\ntype: XYZ\nprompt: q\n";
        let mut inputs = Vec::new();
        for (name, text) in [("a.txt", good), ("b.txt", bad), ("c.txt", good)] {
            let path = dir.path().join(name);
            std::fs::write(&path, text).unwrap();
            inputs.push(path);
        }

        let app = App::initialize(config_in(dir.path()), OutputMode::Import, inputs, None).unwrap();
        let stats = app.run().await.unwrap();

        assert_eq!(stats, RunStats { success: 2, failed: 1, total: 3 });
        assert!(!stats.all_succeeded());
        assert!(dir.path().join("a_bb.txt").exists());
        assert!(dir.path().join("c_bb.txt").exists());
        assert!(!dir.path().join("b_bb.txt").exists());
    }
}
