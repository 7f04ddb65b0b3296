//! LaTeX 文档渲染服务 - 业务能力层
//!
//! 生成完整的 LaTeX 文档：导言区 + 题目编号列表 + 结束标记。
//! 选择题的多个选项放在嵌套的编号列表中，其余题型逐行平铺。

use regex::{Captures, Regex};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::typed::{DocItem, TypedQuestion};
use crate::services::normalizer::LINE_BREAK;

const PREAMBLE: &str = r"\documentclass{article}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{graphicx}
\begin{document}";

const CLOSING: &str = r"\end{document}";

const ENUM_START: &str = r"\begin{enumerate}";
const ENUM_END: &str = r"\end{enumerate}";
const ITEM: &str = r"\item";
const HARD_BREAK: &str = r"\\";

/// LaTeX 文档渲染器
pub struct DocumentRenderer {
    figure_width: String,
    figure: Regex,
}

impl DocumentRenderer {
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            figure_width: config.figure_width.clone(),
            figure: Regex::new(r"@\{(.*?)\}@")?,
        })
    }

    /// 渲染完整文档
    pub fn render(&self, questions: &[TypedQuestion]) -> String {
        let mut lines: Vec<String> = PREAMBLE.lines().map(str::to_string).collect();
        lines.push(ENUM_START.to_string());
        for question in questions {
            lines.push(ITEM.to_string());
            lines.extend(self.question_lines(question));
        }
        lines.push(ENUM_END.to_string());
        lines.push(CLOSING.to_string());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// 单道题的 LaTeX 片段（不含 `\item`）
    pub fn question_lines(&self, question: &TypedQuestion) -> Vec<String> {
        let mut lines = vec![self.format_text(&question.prompt)];
        let items = question.document_items();

        if items.len() == 1 || (!items.is_empty() && !question.kind.is_choice()) {
            for item in &items {
                lines.push(String::new());
                lines.push(self.item_line(item));
            }
        } else if !items.is_empty() {
            lines.push(ENUM_START.to_string());
            for item in &items {
                lines.push(ITEM.to_string());
                lines.push(self.item_line(item));
            }
            lines.push(ENUM_END.to_string());
        }

        if let Some(notes) = &question.notes {
            lines.push(String::new());
            lines.push(format!(r"\textbf{{Notes:}} {}", self.format_text(notes)));
        }

        lines
    }

    /// `\emph{label}: value`，带部分得分时前置加粗标注
    fn item_line(&self, item: &DocItem) -> String {
        // 答案中的公式不使用行间模式
        let value = self.format_text(&item.value).replace("$$", "$");
        let line = format!(r"\emph{{{}}}: {}", escape_percent(&item.label), value);
        match &item.credit {
            Some(credit) => format!(r"\textbf{{({})}} {}", escape_percent(credit), line),
            None => line,
        }
    }

    /// 换行、百分号转义、插图
    fn format_text(&self, text: &str) -> String {
        let text = escape_percent(text).replace(LINE_BREAK, HARD_BREAK);
        self.figure
            .replace_all(&text, |caps: &Captures| {
                format!(
                    r"\includegraphics[width={}]{{{}}}",
                    self.figure_width, &caps[1]
                )
            })
            .into_owned()
    }
}

/// 未转义的 `%` 会注释掉 LaTeX 的整行
fn escape_percent(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = None;
    for c in text.chars() {
        if c == '%' && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}
