use thiserror::Error;

/// 应用程序错误类型
///
/// 每一种错误都会中止当前文档的处理，不做任何恢复
#[derive(Debug, Error)]
pub enum AppError {
    /// 预检错误（带原始行号）
    #[error("第 {line} 行: {message}")]
    Syntax { message: String, line: usize },
    /// 题目结构错误
    #[error("结构错误: {0}")]
    Structural(#[from] StructuralError),
    /// 题型校验错误
    #[error("{kind} 题校验失败: {source}")]
    Validation {
        kind: String,
        #[source]
        source: ValidationError,
    },
    /// 未知题型
    #[error("未知题型: {tag:?}")]
    UnknownType { tag: String },
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 内置正则表达式编译失败
    #[error("正则表达式错误: {0}")]
    Pattern(#[from] regex::Error),
}

/// 题目结构错误（解析器与变体展开阶段）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// 在第一个分隔线之前出现了 key: value 行
    #[error("题目开始之前出现了答案行: {line:?}")]
    AnswerBeforeQuestion { line: String },
    /// 严格模式下无法识别的行
    #[error("无法识别的行: {line:?}")]
    StrayLine { line: String },
    /// 题目缺少 type 或 prompt
    #[error("第 {question} 题缺少字段 {field}")]
    MissingField { question: usize, field: &'static str },
    /// 变体列表长度不一致
    #[error("所有变体列表长度必须相同 (发现长度: {lengths:?})")]
    VariantLengthMismatch { lengths: Vec<usize> },
    /// 展开后仍无法识别的答案标签
    #[error("无法识别的键 {key:?} (题干: {prompt_preview})")]
    UnrecognizedKey { key: String, prompt_preview: String },
}

/// 题型校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 正确答案数量不对
    #[error("只能有 1 个正确答案 (实际: {found})")]
    CorrectCount { found: usize },
    /// 答案数量不在允许范围内
    #[error("答案数量必须在 {min} 到 {max} 之间 (实际: {found})")]
    AnswerCount { min: usize, max: usize, found: usize },
    /// 出现了该题型不接受的标签
    #[error("该题型不接受标签 {label:?}")]
    UnexpectedLabel { label: String },
    /// 判断题答案不是 true/false
    #[error("判断题答案只能是 true 或 false (实际: {value:?})")]
    NotBoolean { value: String },
    /// 数值题答案无法解析为数字
    #[error("{field} 必须是数字 (实际: {value:?})")]
    NotANumber { field: &'static str, value: String },
    /// 匹配题两侧数量不一致
    #[error("所有选项必须有对应的匹配项 (match_a: {left}, match_b: {right})")]
    UnpairedMatch { left: usize, right: usize },
    /// 该题型不支持部分得分
    #[error("该题型不支持部分得分标签 {label:?}")]
    PartialCreditNotAllowed { label: String },
    /// 变量名包含空格
    #[error("变量名中不允许出现空格: {variable:?}")]
    SpaceInVariable { variable: String },
    /// 变量未出现在题干中
    #[error("题干中缺少变量 {variable:?}")]
    MissingVariable { variable: String },
    /// 题干中括号数量与变量数量不一致
    #[error(
        "题干中括号数量不正确 ([: {open}, ]: {close}, 变量: {variables}); 除变量外不要使用 \"[\" 或 \"]\""
    )]
    BracketMismatch {
        open: usize,
        close: usize,
        variables: usize,
    },
    /// 填空变量没有给出答案
    #[error("变量没有给出答案: {entry:?}")]
    VariableWithoutAnswers { entry: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 命令行参数组合无效
    #[error("参数无效: {0}")]
    InvalidArguments(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建预检错误
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        AppError::Syntax {
            message: message.into(),
            line,
        }
    }

    /// 创建题型校验错误
    pub fn validation(kind: impl Into<String>, source: ValidationError) -> Self {
        AppError::Validation {
            kind: kind.into(),
            source,
        }
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
