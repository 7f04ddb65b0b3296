//! # quizmark
//!
//! 把行式标记语言编写的题目转换为 LMS 批量导入文件和 LaTeX 文档
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 模型层（Models）
//! - `models/` - 题目记录、题型枚举、已校验的题目、题型注册表
//! - `TypeRegistry` - 题型标签 → 构造函数，显式传递，不使用全局状态
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `Preflight` / `Normalizer` / `LineParser` / `VariantExpander` - 文本处理
//! - `ImportRenderer` / `DocumentRenderer` - 两种输出格式
//! - `OutputWriter` / `ReportWriter` - 写文件能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文档"的完整转换流程
//! - `DocumentCtx` - 上下文封装（文档序号 + 路径）
//! - `DocumentFlow` - 流程编排（预检 → 规范化 → 解析 → 展开 → 构造 → 渲染）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文档处理器，管理并发和统计
//! - `orchestrator/document_processor` - 单个文档处理器，读写文件
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{QuestionKind, TypeRegistry, TypedQuestion};
pub use orchestrator::{App, RunStats};
pub use workflow::{DocumentCtx, DocumentFlow, OutputMode};
