//! 变体展开服务 - 业务能力层
//!
//! 题干、答案标签、答案内容中的 `%{a, b, c}%` 是变体占位符。
//! 一道含占位符的题目会展开为 N 道题（N 为变体数量），第 i 道题的
//! 每个占位符都替换为各自列表中的第 i 项。

use std::ops::Range;

use regex::Regex;
use tracing::debug;

use crate::error::{AppResult, StructuralError};
use crate::models::kind::is_known_label;
use crate::models::record::QuestionRecord;
use crate::utils::escape::{split_unescaped_commas, unescape_commas};
use crate::utils::spans::rewrite_ranges;
use crate::utils::truncate_text;

/// 错误信息中题干预览的最大长度
const PROMPT_PREVIEW_LEN: usize = 100;

/// 一个字段中的占位符位置及其变体列表
struct FieldVariants {
    ranges: Vec<Range<usize>>,
    lists: Vec<Vec<String>>,
}

impl FieldVariants {
    /// 用第 `index` 个变体替换该字段中所有占位符
    fn resolve(&self, text: &str, index: usize) -> String {
        let mut lists = self.lists.iter();
        rewrite_ranges(text, &self.ranges, |_| {
            lists
                .next()
                .map(|list| unescape_commas(&list[index]))
                .unwrap_or_default()
        })
    }
}

/// 变体展开器
pub struct VariantExpander {
    placeholder: Regex,
}

impl VariantExpander {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            placeholder: Regex::new(r"%\{(.*?)\}%")?,
        })
    }

    /// 展开全部题目，保持源文件顺序，并检查答案标签
    pub fn expand_all(&self, records: Vec<QuestionRecord>) -> AppResult<Vec<QuestionRecord>> {
        let mut expanded = Vec::with_capacity(records.len());
        for record in records {
            expanded.extend(self.expand(record)?);
        }
        for record in &expanded {
            check_labels(record)?;
        }
        Ok(expanded)
    }

    /// 展开一道题；没有占位符时原样返回
    pub fn expand(&self, record: QuestionRecord) -> AppResult<Vec<QuestionRecord>> {
        let prompt = self.scan(&record.prompt);
        let labels: Vec<_> = record.answers.iter().map(|a| self.scan(&a.label)).collect();
        let values: Vec<_> = record.answers.iter().map(|a| self.scan(&a.value)).collect();

        let lengths: Vec<usize> = std::iter::once(&prompt)
            .chain(labels.iter())
            .chain(values.iter())
            .flat_map(|field| field.lists.iter().map(Vec::len))
            .collect();

        let Some(&count) = lengths.first() else {
            return Ok(vec![record]);
        };
        if lengths.iter().any(|&len| len != count) {
            return Err(StructuralError::VariantLengthMismatch { lengths }.into());
        }

        debug!("第 {} 题展开为 {} 个变体", record.number, count);

        let variants = (0..count)
            .map(|i| {
                let mut variant = record.clone();
                variant.prompt = prompt.resolve(&record.prompt, i);
                for (j, answer) in variant.answers.iter_mut().enumerate() {
                    answer.label = labels[j].resolve(&record.answers[j].label, i);
                    answer.value = values[j].resolve(&record.answers[j].value, i);
                }
                variant
            })
            .collect();

        Ok(variants)
    }

    fn scan(&self, text: &str) -> FieldVariants {
        let mut ranges = Vec::new();
        let mut lists = Vec::new();
        for caps in self.placeholder.captures_iter(text) {
            if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
                ranges.push(whole.range());
                lists.push(split_unescaped_commas(inner.as_str()));
            }
        }
        FieldVariants { ranges, lists }
    }
}

/// 展开后每个答案标签（去掉部分得分标注）都必须可识别
fn check_labels(record: &QuestionRecord) -> Result<(), StructuralError> {
    match record
        .answers
        .iter()
        .find(|a| !is_known_label(a.parsed_label().key))
    {
        Some(answer) => Err(StructuralError::UnrecognizedKey {
            key: answer.label.clone(),
            prompt_preview: truncate_text(&record.prompt, PROMPT_PREVIEW_LEN),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::record::Answer;

    fn record(prompt: &str, pairs: &[(&str, &str)]) -> QuestionRecord {
        QuestionRecord {
            kind_tag: "MC".to_string(),
            prompt: prompt.to_string(),
            answers: pairs.iter().map(|(l, v)| Answer::new(*l, *v)).collect(),
            number: 1,
        }
    }

    #[test]
    fn test_plain_record_is_identity() {
        let expander = VariantExpander::new().unwrap();
        let plain = record("What is 2 + 2?", &[("correct", "4"), ("incorrect", "5")]);
        assert_eq!(expander.expand(plain.clone()).unwrap(), vec![plain]);
    }

    #[test]
    fn test_placeholders_expand_in_lockstep() {
        let expander = VariantExpander::new().unwrap();
        let template = record(
            "Pick %{a,b}%",
            &[("correct", "%{x, y}%"), ("incorrect", "z")],
        );
        let variants = expander.expand(template).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].prompt, "Pick a");
        assert_eq!(variants[0].answers[0].value, "x");
        assert_eq!(variants[1].prompt, "Pick b");
        assert_eq!(variants[1].answers[0].value, "y");
        assert_eq!(variants[1].answers[1].value, "z");
    }

    #[test]
    fn test_placeholder_in_label() {
        let expander = VariantExpander::new().unwrap();
        let template = record(
            "Is %{2, 3}% prime?",
            &[("%{correct, incorrect}%", "yes"), ("%{incorrect, correct}%", "no")],
        );
        let variants = expander.expand(template).unwrap();
        assert_eq!(variants[0].answers[0].label, "correct");
        assert_eq!(variants[1].answers[0].label, "incorrect");
        assert_eq!(variants[1].answers[1].label, "correct");
    }

    #[test]
    fn test_unequal_lengths_fail() {
        let expander = VariantExpander::new().unwrap();
        let template = record("%{a, b}%", &[("correct", "%{x, y, z}%")]);
        let err = expander.expand(template).unwrap_err();
        assert!(matches!(
            err,
            AppError::Structural(StructuralError::VariantLengthMismatch { ref lengths })
                if *lengths == vec![2, 3]
        ));
    }

    #[test]
    fn test_escaped_comma_in_variant() {
        let expander = VariantExpander::new().unwrap();
        let template = record(r"%{one\, two, three}%", &[]);
        let variants = expander.expand(template).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].prompt, "one, two");
        assert_eq!(variants[1].prompt, "three");
    }

    #[test]
    fn test_expand_all_keeps_source_order() {
        let expander = VariantExpander::new().unwrap();
        let mut first = record("first", &[]);
        first.number = 1;
        let mut second = record("%{s1, s2}%", &[]);
        second.number = 2;
        let mut third = record("third", &[]);
        third.number = 3;

        let prompts: Vec<_> = expander
            .expand_all(vec![first, second, third])
            .unwrap()
            .into_iter()
            .map(|r| r.prompt)
            .collect();
        assert_eq!(prompts, vec!["first", "s1", "s2", "third"]);
    }

    #[test]
    fn test_unrecognized_key_after_expansion() {
        let expander = VariantExpander::new().unwrap();
        let long_prompt = "x".repeat(150);
        let bad = record(&long_prompt, &[("corect", "a")]);
        let err = expander.expand_all(vec![bad]).unwrap_err();
        match err {
            AppError::Structural(StructuralError::UnrecognizedKey { key, prompt_preview }) => {
                assert_eq!(key, "corect");
                assert_eq!(prompt_preview.chars().count(), 103);
                assert!(prompt_preview.ends_with("..."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partial_credit_label_is_recognized() {
        let expander = VariantExpander::new().unwrap();
        let ok = record("q", &[("correct", "a"), ("incorrect (50%)", "b")]);
        assert_eq!(expander.expand_all(vec![ok]).unwrap().len(), 1);
    }
}
