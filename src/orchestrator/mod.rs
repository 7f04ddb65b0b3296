//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责读写文件、批量调度和统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文档处理器
//! - 校验命令行参数组合
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `document_processor` - 单个文档处理器
//! - 读取输入文件
//! - 委托 DocumentFlow 完成转换
//! - 计算输出路径并原子写入
//! - 向运行报告追加结果
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! document_processor (处理单个文件)
//!     ↓
//! workflow::DocumentFlow (处理单个文档的文本)
//!     ↓
//! services (能力层：预检 / 规范化 / 解析 / 展开 / 渲染)
//!     ↓
//! models (题型模型与注册表)
//! ```

pub mod batch_processor;
pub mod document_processor;

pub use batch_processor::{App, RunStats};
pub use document_processor::{process_document, OutputTargets};
