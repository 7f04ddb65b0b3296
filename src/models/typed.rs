//! 题型模型
//!
//! 每种题型在构造时完成一次校验，之后的两种投影（导入格式 / 文档格式）
//! 都是对已校验状态的纯函数，不会失败。

use crate::error::ValidationError;
use crate::models::kind::QuestionKind;
use crate::models::record::Answer;
use crate::utils::escape::{split_unescaped_commas, unescape_commas};

/// 排序题允许的答案数量
const MAX_ORDERING_ANSWERS: usize = 20;

/// 已校验的题目
#[derive(Debug, Clone, PartialEq)]
pub struct TypedQuestion {
    pub kind: QuestionKind,
    pub prompt: String,
    pub body: QuestionBody,
    /// `notes` 标签的内容，只出现在文档中
    pub notes: Option<String>,
}

/// 各题型校验后的内容
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionBody {
    /// 单选 / 多选
    Choices(Vec<Choice>),
    TrueFalse(bool),
    /// 论述 / 简答，可带一个参考答案
    Essay { example: Option<String> },
    Ordering(Vec<String>),
    /// 匹配题各项，保持源文件顺序
    Matching(Vec<String>),
    /// 文件上传 / 观点量表，只有题干
    PromptOnly,
    Numeric {
        answer: String,
        tolerance: Option<String>,
    },
    /// 选项 → 变量列表（干扰项的列表为空）
    Jumbled(Vec<(String, Vec<String>)>),
    /// 变量 → 可接受答案列表
    FillIn(Vec<(String, Vec<String>)>),
}

/// 选择题的一个选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub correct: bool,
    pub value: String,
    pub credit: Option<String>,
}

impl Choice {
    fn label(&self) -> &'static str {
        if self.correct {
            "correct"
        } else {
            "incorrect"
        }
    }
}

/// 文档格式中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocItem {
    pub label: String,
    pub value: String,
    /// 部分得分标注（仅选择题）
    pub credit: Option<String>,
}

impl DocItem {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            credit: None,
        }
    }
}

impl TypedQuestion {
    /// 导入格式的字段列表：题型、题干、其余字段
    pub fn import_fields(&self) -> Vec<String> {
        let mut fields = vec![self.kind.tag().to_string(), self.prompt.clone()];

        match &self.body {
            QuestionBody::Choices(choices) => {
                for choice in choices {
                    fields.push(choice.value.clone());
                    fields.push(choice.label().to_string());
                }
            }
            QuestionBody::TrueFalse(answer) => fields.push(answer.to_string()),
            QuestionBody::Essay { example } => fields.extend(example.iter().cloned()),
            QuestionBody::Ordering(values) | QuestionBody::Matching(values) => {
                fields.extend(values.iter().cloned())
            }
            QuestionBody::PromptOnly => {}
            QuestionBody::Numeric { answer, tolerance } => {
                fields.push(answer.clone());
                fields.extend(tolerance.iter().cloned());
            }
            QuestionBody::Jumbled(mappings) | QuestionBody::FillIn(mappings) => {
                for (key, values) in mappings {
                    fields.push(key.clone());
                    fields.extend(values.iter().cloned());
                    fields.push(String::new());
                }
            }
        }

        fields
    }

    /// 文档格式的条目列表（不含题干和备注）
    pub fn document_items(&self) -> Vec<DocItem> {
        match &self.body {
            QuestionBody::Choices(choices) => choices
                .iter()
                .map(|choice| DocItem {
                    label: choice.label().to_string(),
                    value: choice.value.clone(),
                    credit: choice.credit.clone(),
                })
                .collect(),
            QuestionBody::TrueFalse(answer) => vec![DocItem::new("answer", answer.to_string())],
            QuestionBody::Essay { example } => example
                .iter()
                .map(|value| DocItem::new("example", value.clone()))
                .collect(),
            QuestionBody::Ordering(values) => values
                .iter()
                .enumerate()
                .map(|(i, value)| DocItem::new((i + 1).to_string(), value.clone()))
                .collect(),
            QuestionBody::Matching(values) => values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let side = if i % 2 == 0 { 'a' } else { 'b' };
                    DocItem::new(format!("{}{}", i / 2 + 1, side), value.clone())
                })
                .collect(),
            QuestionBody::PromptOnly => Vec::new(),
            QuestionBody::Numeric { answer, tolerance } => {
                let mut items = vec![DocItem::new("answer", answer.clone())];
                if let Some(tolerance) = tolerance {
                    items.push(DocItem::new("tolerance", format!("$\\pm${}", tolerance)));
                }
                items
            }
            QuestionBody::Jumbled(mappings) | QuestionBody::FillIn(mappings) => mappings
                .iter()
                .map(|(key, values)| DocItem::new(key.clone(), values.join(", ")))
                .collect(),
        }
    }
}

// ========== 各题型的构造函数 ==========

/// 单选题：恰好一个 correct
pub fn build_single_choice(prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let body = build_multi_choice(prompt, answers)?;
    if let QuestionBody::Choices(choices) = &body {
        let found = choices.iter().filter(|c| c.correct).count();
        if found != 1 {
            return Err(ValidationError::CorrectCount { found });
        }
    }
    Ok(body)
}

/// 多选题：不限制正确答案数量
pub fn build_multi_choice(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let choices = answers
        .iter()
        .map(|answer| {
            let label = answer.parsed_label();
            let correct = match label.key {
                "correct" => true,
                "incorrect" => false,
                _ => return Err(unexpected(answer)),
            };
            Ok(Choice {
                correct,
                value: answer.value.clone(),
                credit: label.credit.map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QuestionBody::Choices(choices))
}

/// 判断题：一个 answer，取值 true / false
pub fn build_true_false(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let answer = single_labelled(answers, "answer")?;
    match answer.value.as_str() {
        "true" => Ok(QuestionBody::TrueFalse(true)),
        "false" => Ok(QuestionBody::TrueFalse(false)),
        other => Err(ValidationError::NotBoolean {
            value: other.to_string(),
        }),
    }
}

/// 论述题 / 简答题：最多一个 example
pub fn build_essay(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    if answers.len() > 1 {
        return Err(ValidationError::AnswerCount {
            min: 0,
            max: 1,
            found: answers.len(),
        });
    }
    let example = match answers.first() {
        Some(answer) if answer.parsed_label().key == "example" => Some(answer.value.clone()),
        Some(answer) => return Err(unexpected(answer)),
        None => None,
    };
    Ok(QuestionBody::Essay { example })
}

/// 排序题：1 到 20 个答案
pub fn build_ordering(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    if answers.is_empty() || answers.len() > MAX_ORDERING_ANSWERS {
        return Err(ValidationError::AnswerCount {
            min: 1,
            max: MAX_ORDERING_ANSWERS,
            found: answers.len(),
        });
    }
    Ok(QuestionBody::Ordering(
        answers.iter().map(|a| a.value.clone()).collect(),
    ))
}

/// 匹配题：match_a 与 match_b 数量相同
pub fn build_matching(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let count = |key: &str| answers.iter().filter(|a| a.parsed_label().key == key).count();
    let (left, right) = (count("match_a"), count("match_b"));
    if left != right {
        return Err(ValidationError::UnpairedMatch { left, right });
    }
    Ok(QuestionBody::Matching(
        answers.iter().map(|a| a.value.clone()).collect(),
    ))
}

/// 文件上传题 / 观点量表题：只有题干
pub fn build_prompt_only(_prompt: &str, _answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    Ok(QuestionBody::PromptOnly)
}

/// 数值题：一个 answer，可选一个 tolerance，均为数字
pub fn build_numeric(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let mut answer = None;
    let mut tolerance = None;
    let mut answer_count = 0;

    for entry in answers {
        match entry.parsed_label().key {
            "answer" => {
                answer_count += 1;
                answer = Some(parse_number("answer", &entry.value)?);
            }
            "tolerance" if tolerance.is_none() => {
                tolerance = Some(parse_number("tolerance", &entry.value)?);
            }
            _ => return Err(unexpected(entry)),
        }
    }

    match (answer, answer_count) {
        (Some(answer), 1) => Ok(QuestionBody::Numeric { answer, tolerance }),
        _ => Err(ValidationError::AnswerCount {
            min: 1,
            max: 1,
            found: answer_count,
        }),
    }
}

/// 选词填空：`选项` 或 `选项 : 变量[, 变量...]`
///
/// 变量名不能含空格，必须出现在题干中，且题干中 `[` 与 `]` 的数量都等于变量总数
pub fn build_jumbled_sentence(prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let mut mappings = Vec::new();
    let mut variables = Vec::new();

    for answer in answers {
        let (choice, bound) = match split_binding(&answer.value) {
            Some((choice, list)) => {
                let bound: Vec<String> = split_unescaped_commas(list)
                    .iter()
                    .map(|v| unescape_commas(v))
                    .collect();
                variables.extend(bound.iter().cloned());
                (choice.to_string(), bound)
            }
            None => (answer.value.trim_matches(':').trim().to_string(), Vec::new()),
        };
        upsert(&mut mappings, choice, bound);
    }

    if let Some(variable) = variables.iter().find(|v| v.contains(' ')) {
        return Err(ValidationError::SpaceInVariable {
            variable: variable.clone(),
        });
    }
    if let Some(variable) = variables.iter().find(|v| !prompt.contains(v.as_str())) {
        return Err(ValidationError::MissingVariable {
            variable: variable.clone(),
        });
    }
    let open = prompt.matches('[').count();
    let close = prompt.matches(']').count();
    if open != close || open != variables.len() {
        return Err(ValidationError::BracketMismatch {
            open,
            close,
            variables: variables.len(),
        });
    }

    Ok(QuestionBody::Jumbled(mappings))
}

/// 多空填空：每一项都必须是 `变量 : 答案[, 答案...]`
pub fn build_fill_in_blanks(_prompt: &str, answers: &[Answer]) -> Result<QuestionBody, ValidationError> {
    let mut mappings = Vec::new();

    for answer in answers {
        let (variable, list) =
            split_binding(&answer.value).ok_or_else(|| ValidationError::VariableWithoutAnswers {
                entry: answer.value.clone(),
            })?;
        let accepted = split_unescaped_commas(list)
            .iter()
            .map(|v| unescape_commas(v))
            .collect();
        upsert(&mut mappings, variable.to_string(), accepted);
    }

    Ok(QuestionBody::FillIn(mappings))
}

// ========== 辅助函数 ==========

fn unexpected(answer: &Answer) -> ValidationError {
    ValidationError::UnexpectedLabel {
        label: answer.label.clone(),
    }
}

/// 恰好一个答案且标签为 `key`
fn single_labelled<'a>(answers: &'a [Answer], key: &str) -> Result<&'a Answer, ValidationError> {
    if let Some(other) = answers.iter().find(|a| a.parsed_label().key != key) {
        return Err(unexpected(other));
    }
    match answers {
        [answer] => Ok(answer),
        _ => Err(ValidationError::AnswerCount {
            min: 1,
            max: 1,
            found: answers.len(),
        }),
    }
}

/// 把数字规范化为浮点字符串：`3` → `3.0`，`3.14` → `3.14`
fn parse_number(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let not_a_number = || ValidationError::NotANumber {
        field,
        value: value.to_string(),
    };
    let number: f64 = value.trim().parse().map_err(|_| not_a_number())?;
    if !number.is_finite() {
        return Err(not_a_number());
    }
    Ok(float_repr(number))
}

/// 与常见脚本语言的浮点输出一致：`3.0`、`0.0001`、`1e-05`、`1e+20`
///
/// 十进制指数小于 -4 或不小于 16 时使用科学计数法，指数至少两位
fn float_repr(number: f64) -> String {
    let scientific = format!("{:e}", number);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if number != 0.0 && (exponent < -4 || exponent >= 16) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let plain = number.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

/// `key : list` 拆分；冒号后没有任何字母数字时视为没有绑定
fn split_binding(value: &str) -> Option<(&str, &str)> {
    let (key, list) = value.split_once(':')?;
    if list.chars().any(|c| c.is_alphanumeric() || c == '_') {
        Some((key.trim(), list.trim()))
    } else {
        None
    }
}

/// 保持首次出现的位置，重复的键覆盖旧值
fn upsert(mappings: &mut Vec<(String, Vec<String>)>, key: String, values: Vec<String>) {
    match mappings.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = values,
        None => mappings.push((key, values)),
    }
}
