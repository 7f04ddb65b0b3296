//! 文本区间定位工具
//!
//! 公式区间 (`$...$` / `$$...$$`) 与命令参数区间 (`\mathrm{...}`) 的扫描。
//! 预检与规范化共用同一套定位逻辑，改写时按区间逐段替换。

use std::ops::Range;

/// 一个公式区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceSpan {
    /// 开头 `$` 的位置
    pub start: usize,
    /// 公式内容（不含 `$`）
    pub body: Range<usize>,
    /// 结尾 `$` 之后的位置
    pub end: usize,
}

/// 找出所有公式区间
///
/// 连续的 `$` 视为一个定界符，未闭合的公式被忽略
pub fn math_fences(text: &str) -> Vec<FenceSpan> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < len {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let start = i;
        while i < len && bytes[i] == b'$' {
            i += 1;
        }
        let body_start = i;
        while i < len && bytes[i] != b'$' {
            i += 1;
        }
        if i == len {
            break;
        }
        let body_end = i;
        while i < len && bytes[i] == b'$' {
            i += 1;
        }
        spans.push(FenceSpan {
            start,
            body: body_start..body_end,
            end: i,
        });
    }

    spans
}

/// 找出 `command` (例如 `\mathrm{`) 之后到第一个 `}` 之间的内容区间
///
/// 与单行匹配一致：中间出现换行则不算
pub fn command_arguments(text: &str, command: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut from = 0;

    while let Some(found) = text[from..].find(command) {
        let inner_start = from + found + command.len();
        match text[inner_start..].find(&['}', '\n'][..]) {
            Some(rel) if text[inner_start + rel..].starts_with('}') => {
                ranges.push(inner_start..inner_start + rel);
                from = inner_start + rel + 1;
            }
            Some(rel) => from = inner_start + rel,
            None => break,
        }
    }

    ranges
}

/// 按区间改写文本，区间之外的内容原样保留
///
/// `ranges` 必须按起点升序且互不重叠
pub fn rewrite_ranges<F>(text: &str, ranges: &[Range<usize>], mut rewrite: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in ranges {
        out.push_str(&text[last..range.start]);
        out.push_str(&rewrite(&text[range.clone()]));
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

/// 偏移量所在的行号（从 1 开始）
pub fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
