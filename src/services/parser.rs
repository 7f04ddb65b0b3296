//! 行解析服务 - 业务能力层
//!
//! 把规范化后的文本解析为题目记录列表：
//! - 空行与 `#` 开头的注释行跳过
//! - `-------` 开始一道新题
//! - `key: value` 行按第一个冒号拆分；`type` / `prompt` 直接赋值（后写覆盖），
//!   其余键按出现顺序追加到答案列表，不在这里校验键名

use tracing::warn;

use crate::error::{AppResult, StructuralError};
use crate::models::record::{Answer, QuestionRecord};
use crate::utils::truncate_text;

/// 题目分隔线前缀
const QUESTION_DELIMITER: &str = "-------";
const COMMENT_MARKER: char = '#';

/// 行解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser {
    /// 严格模式：无法识别的行直接报错，否则记录警告后跳过
    strict: bool,
}

impl LineParser {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// 解析整篇文本
    pub fn parse(&self, text: &str) -> AppResult<Vec<QuestionRecord>> {
        let mut records: Vec<QuestionRecord> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }

            if line.starts_with(QUESTION_DELIMITER) {
                if let Some(previous) = records.last() {
                    check_complete(previous)?;
                }
                records.push(QuestionRecord::new(records.len() + 1));
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let current = records.last_mut().ok_or_else(|| {
                    StructuralError::AnswerBeforeQuestion {
                        line: truncate_text(line, 100),
                    }
                })?;
                let (key, value) = (key.trim(), value.trim());
                match key {
                    "type" => current.kind_tag = value.to_string(),
                    "prompt" => current.prompt = value.to_string(),
                    _ => current.answers.push(Answer::new(key, value)),
                }
                continue;
            }

            if self.strict {
                return Err(StructuralError::StrayLine {
                    line: truncate_text(line, 100),
                }
                .into());
            }
            warn!("⚠️ 忽略无法识别的行: {}", truncate_text(line, 100));
        }

        if let Some(last) = records.last() {
            check_complete(last)?;
        }

        Ok(records)
    }
}

/// 每道题都必须有 type 和 prompt
fn check_complete(record: &QuestionRecord) -> Result<(), StructuralError> {
    let missing = if record.kind_tag.is_empty() {
        Some("type")
    } else if record.prompt.is_empty() {
        Some("prompt")
    } else {
        None
    };
    match missing {
        Some(field) => Err(StructuralError::MissingField {
            question: record.number,
            field,
        }),
        None => Ok(()),
    }
}
