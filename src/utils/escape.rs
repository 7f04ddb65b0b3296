//! 逗号转义处理
//!
//! `\,` 表示字面逗号，其余逗号是列表分隔符

/// 按未转义的逗号拆分，并去掉每一项两侧的空格
///
/// 返回的每一项仍保留 `\,` 转义，调用方按需调用 [`unescape_commas`]
pub fn split_unescaped_commas(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut prev_backslash = false;

    for c in text.chars() {
        if c == ',' && !prev_backslash {
            items.push(current.trim_matches(' ').to_string());
            current.clear();
        } else {
            current.push(c);
        }
        prev_backslash = c == '\\';
    }
    items.push(current.trim_matches(' ').to_string());

    items
}

/// `\,` → `,`
pub fn unescape_commas(text: &str) -> String {
    text.replace("\\,", ",")
}
