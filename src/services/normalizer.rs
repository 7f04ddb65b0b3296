//! 文本规范化服务 - 业务能力层
//!
//! 在按行解析之前对整篇文本做确定性的改写：
//! 1. 续行合并（插入 `<br>`）
//! 2. `<` / `>` 两侧补空格
//! 3. 删除制表符
//! 4. 展开以 `\` 结尾的公式续行
//! 5. `\text{}` → `\mathrm{}`，其中的连续空格 → `~`
//! 6. 清理命令边界处多余的空格（`\left (`、`} {`，公式内反斜杠前的空格）
//! 7. 公式内的空格 → `{}`
//!
//! 第 5、7 步只改写扫描得到的区间，不做全文替换。

use regex::Regex;

use crate::error::AppResult;
use crate::utils::spans::{command_arguments, math_fences, rewrite_ranges};

/// 规范化后的换行标记，由各渲染器翻译
pub const LINE_BREAK: &str = "<br>";

/// 文本规范化器
pub struct Normalizer {
    continuation: Regex,
    matrix_row_end: Regex,
    escaped_newline: Regex,
    left_right: Regex,
    brace_gap: Regex,
    before_command: Regex,
}

impl Normalizer {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            continuation: Regex::new(r" *\n *> *")?,
            matrix_row_end: Regex::new(r" *\\\\\n *")?,
            escaped_newline: Regex::new(r" *\\\n *")?,
            left_right: Regex::new(r"(\\left|\\right) +")?,
            brace_gap: Regex::new(r"\} +\{")?,
            before_command: Regex::new(r" +\\")?,
        })
    }

    /// 执行全部改写步骤
    pub fn normalize(&self, text: &str) -> String {
        let text = self.continuation.replace_all(text, LINE_BREAK);
        let text = pad_angle_brackets(&text);
        let text = text.replace('\t', "");
        let text = self.matrix_row_end.replace_all(&text, r"\\");
        let text = self.escaped_newline.replace_all(&text, " ");
        let text = space_identifiers(&text);
        let text = self.left_right.replace_all(&text, "$1");
        let text = self.brace_gap.replace_all(&text, "}{");
        self.space_math(&text)
    }

    /// 公式内容：去掉反斜杠前的空格，其余空格替换为 `{}`
    fn space_math(&self, text: &str) -> String {
        let bodies: Vec<_> = math_fences(text).into_iter().map(|span| span.body).collect();
        rewrite_ranges(text, &bodies, |body| {
            self.before_command.replace_all(body, r"\").replace(' ', "{}")
        })
    }
}

/// `<` / `>` 两侧各保留一个空格，`<br>` 保持不变
fn pad_angle_brackets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with(LINE_BREAK) {
            out.push_str(LINE_BREAK);
            rest = &rest[LINE_BREAK.len()..];
        } else if c == '<' || c == '>' {
            let trimmed = out.trim_end_matches(' ').len();
            out.truncate(trimmed);
            out.push(' ');
            out.push(c);
            out.push(' ');
            rest = rest[1..].trim_start_matches(' ');
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

/// `\text{}` 统一为 `\mathrm{}`，参数中的连续空格替换为一个 `~`
///
/// 不使用 `\,`：变体列表按未转义的逗号切分后会把 `\,` 还原成逗号
fn space_identifiers(text: &str) -> String {
    let text = text.replace(r"\text{", r"\mathrm{");
    let ranges = command_arguments(&text, r"\mathrm{");
    rewrite_ranges(&text, &ranges, |arg| {
        arg.split(' ')
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join("~")
    })
}
