//! 文档处理流程 - 流程层
//!
//! 核心职责：定义"一个文档"的完整转换流程，全部在内存中完成
//!
//! 流程顺序：
//! 1. 预检（原始文本，只读）
//! 2. 规范化 → 按行解析 → 变体展开
//! 3. 随机排序答案（可选）
//! 4. 按题型构造并校验
//! 5. 渲染导入文件 / LaTeX 文档
//!
//! 任何一步出错都立即返回，不产生部分结果。

use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{TypeRegistry, TypedQuestion};
use crate::services::{
    AnswerShuffler, DocumentRenderer, ImportRenderer, LineParser, Normalizer, Preflight,
    VariantExpander,
};
use crate::workflow::document_ctx::DocumentCtx;

/// 需要生成的输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// 只生成 LMS 导入文件
    Import,
    /// 只生成 LaTeX 文档
    Document,
    /// 两者都生成
    #[default]
    Both,
}

impl OutputMode {
    pub fn wants_import(self) -> bool {
        matches!(self, OutputMode::Import | OutputMode::Both)
    }

    pub fn wants_document(self) -> bool {
        matches!(self, OutputMode::Document | OutputMode::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Import => "import",
            OutputMode::Document => "document",
            OutputMode::Both => "both",
        }
    }
}

/// 一个文档的渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// 展开后的题目数量
    pub question_count: usize,
    pub import: Option<String>,
    pub document: Option<String>,
}

/// 文档处理流程
///
/// - 编排单个文档的完整转换
/// - 不读写文件，只处理文本
/// - 只依赖业务能力（services）和题型注册表
pub struct DocumentFlow {
    preflight: Preflight,
    normalizer: Normalizer,
    parser: LineParser,
    expander: VariantExpander,
    registry: TypeRegistry,
    import_renderer: ImportRenderer,
    document_renderer: DocumentRenderer,
    mode: OutputMode,
    randomize: bool,
    seed: Option<u64>,
}

impl DocumentFlow {
    /// 使用内置题型创建流程
    pub fn new(config: &Config, mode: OutputMode) -> AppResult<Self> {
        Self::with_registry(config, mode, TypeRegistry::standard())
    }

    /// 使用指定的题型注册表创建流程
    pub fn with_registry(
        config: &Config,
        mode: OutputMode,
        registry: TypeRegistry,
    ) -> AppResult<Self> {
        Ok(Self {
            preflight: Preflight::new()?,
            normalizer: Normalizer::new()?,
            parser: LineParser::new(config.strict_lines),
            expander: VariantExpander::new()?,
            registry,
            import_renderer: ImportRenderer::new(config)?,
            document_renderer: DocumentRenderer::new(config)?,
            mode,
            randomize: config.randomize,
            seed: config.seed,
        })
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// 转换一个文档
    pub fn run(&self, text: &str, ctx: &DocumentCtx) -> AppResult<RenderedDocument> {
        let questions = self.build_questions(text, ctx)?;

        let import = self
            .mode
            .wants_import()
            .then(|| self.import_renderer.render(&questions));
        let document = self
            .mode
            .wants_document()
            .then(|| self.document_renderer.render(&questions));

        info!("{} ✓ 转换完成，共 {} 道题", ctx, questions.len());

        Ok(RenderedDocument {
            question_count: questions.len(),
            import,
            document,
        })
    }

    /// 预检 → 规范化 → 解析 → 展开 → (打乱) → 构造
    pub fn build_questions(&self, text: &str, ctx: &DocumentCtx) -> AppResult<Vec<TypedQuestion>> {
        self.preflight.check(text)?;

        let normalized = self.normalizer.normalize(text);
        let records = self.parser.parse(&normalized)?;
        debug!("{} 解析得到 {} 道题", ctx, records.len());

        let mut records = self.expander.expand_all(records)?;
        debug!("{} 变体展开后共 {} 道题", ctx, records.len());

        if self.randomize {
            AnswerShuffler::new(self.seed).shuffle_all(&mut records);
        }

        records
            .iter()
            .map(|record| self.registry.build(record))
            .collect()
    }
}
