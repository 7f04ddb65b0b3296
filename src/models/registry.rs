//! 题型注册表
//!
//! 题型标签 → 构造函数。在启动时构造一次，显式传给需要它的流程，
//! 不使用全局状态。简答题与论述题、观点量表题与文件上传题共用同一个构造函数。

use std::collections::HashMap;

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::kind::{QuestionKind, NOTES_LABEL};
use crate::models::record::{Answer, QuestionRecord};
use crate::models::typed::{self, QuestionBody, TypedQuestion};

/// 题型构造函数：校验答案并生成题目内容
pub type BodyBuilder = fn(&str, &[Answer]) -> Result<QuestionBody, ValidationError>;

/// 题型注册表
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    builders: HashMap<QuestionKind, BodyBuilder>,
}

impl TypeRegistry {
    /// 包含全部内置题型的注册表
    pub fn standard() -> Self {
        let entries: [(QuestionKind, BodyBuilder); 12] = [
            (QuestionKind::SingleChoice, typed::build_single_choice),
            (QuestionKind::MultiChoice, typed::build_multi_choice),
            (QuestionKind::TrueFalse, typed::build_true_false),
            (QuestionKind::Essay, typed::build_essay),
            (QuestionKind::ShortResponse, typed::build_essay),
            (QuestionKind::Ordering, typed::build_ordering),
            (QuestionKind::Matching, typed::build_matching),
            (QuestionKind::FileUpload, typed::build_prompt_only),
            (QuestionKind::Opinion, typed::build_prompt_only),
            (QuestionKind::Numeric, typed::build_numeric),
            (QuestionKind::JumbledSentence, typed::build_jumbled_sentence),
            (QuestionKind::FillInBlanks, typed::build_fill_in_blanks),
        ];
        Self {
            builders: entries.into_iter().collect(),
        }
    }

    /// 已注册的题型数量
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// 根据展开后的记录构造已校验的题目
    ///
    /// `notes` 答案先被取出，不参与校验；部分得分标注出现在非选择题或 notes 上时直接报错
    pub fn build(&self, record: &QuestionRecord) -> AppResult<TypedQuestion> {
        let unknown = || AppError::UnknownType {
            tag: record.kind_tag.clone(),
        };
        let kind = QuestionKind::from_tag(&record.kind_tag).ok_or_else(unknown)?;
        let builder = self.builders.get(&kind).ok_or_else(unknown)?;

        // 部分得分只能标在选择题的选项上，notes 一律不允许
        let misplaced_credit = record.answers.iter().find(|a| {
            let label = a.parsed_label();
            label.credit.is_some() && (!kind.allows_partial_credit() || label.key == NOTES_LABEL)
        });
        if let Some(answer) = misplaced_credit {
            return Err(AppError::validation(
                kind.tag(),
                ValidationError::PartialCreditNotAllowed {
                    label: answer.label.clone(),
                },
            ));
        }

        let (notes, answers): (Vec<&Answer>, Vec<&Answer>) = record
            .answers
            .iter()
            .partition(|a| a.parsed_label().key == NOTES_LABEL);
        let answers: Vec<Answer> = answers.into_iter().cloned().collect();

        let body = builder(&record.prompt, &answers)
            .map_err(|source| AppError::validation(kind.tag(), source))?;

        let notes = if notes.is_empty() {
            None
        } else {
            Some(
                notes
                    .iter()
                    .map(|a| a.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        };

        Ok(TypedQuestion {
            kind,
            prompt: record.prompt.clone(),
            body,
            notes,
        })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
