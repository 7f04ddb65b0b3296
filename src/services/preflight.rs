//! 预检服务 - 业务能力层
//!
//! 在规范化之前扫描原始文本，查找会破坏导入文件或 LaTeX 的已知写法。
//! 行号对应作者的原始行，只报告第一处问题。

use regex::Regex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::utils::spans::{command_arguments, line_of, math_fences};

/// 参数中不允许出现空格的标识符命令
const IDENTIFIER_COMMANDS: [&str; 3] = [r"\mathit{", r"\mathbf{", r"\operatorname{"];

/// 一条检查规则
struct Rule {
    name: &'static str,
    check: RuleCheck,
    message: &'static str,
}

enum RuleCheck {
    Pattern(Regex),
    /// 返回第一处违规的字节偏移
    Scan(fn(&str) -> Option<usize>),
}

impl Rule {
    fn first_violation(&self, text: &str) -> Option<usize> {
        match &self.check {
            RuleCheck::Pattern(re) => re.find(text).map(|m| m.start()),
            RuleCheck::Scan(scan) => scan(text),
        }
    }
}

/// 预检器
pub struct Preflight {
    rules: Vec<Rule>,
}

impl Preflight {
    /// 创建带全部内置规则的预检器
    pub fn new() -> AppResult<Self> {
        let rules = vec![
            Rule {
                name: "tab",
                check: RuleCheck::Pattern(Regex::new(r"\t")?),
                message: "不要使用制表符 (tab)，它会破坏导入文件的分隔格式",
            },
            Rule {
                name: "angle",
                check: RuleCheck::Scan(unspaced_angle_bracket),
                message: "\"<\" 和 \">\" 两侧需要空格，否则 MathJax 会解析出错",
            },
            Rule {
                name: "mbox",
                check: RuleCheck::Pattern(Regex::new(r"\\mbox\{")?),
                message: r"不支持 \mbox{...}，请改用 \mathrm{...}",
            },
            Rule {
                name: "textrm",
                check: RuleCheck::Pattern(Regex::new(r"\\textrm\{")?),
                message: r"不支持 \textrm{...}，请改用 \mathrm{...}",
            },
            Rule {
                name: "macro",
                check: RuleCheck::Pattern(Regex::new(
                    r"\\(?:re|provide)?newcommand\b|\\def\\",
                )?),
                message: r"不支持宏定义 (\newcommand / \def)",
            },
            Rule {
                name: "identifier",
                check: RuleCheck::Scan(spaced_identifier),
                message: r"\mathit / \mathbf / \operatorname 的参数中不能有空格，多个单词请使用 \mathrm{...}",
            },
            Rule {
                name: "fence",
                check: RuleCheck::Scan(space_inside_fence),
                message: "公式定界符 \"$\" 内侧不能紧跟空格",
            },
        ];
        Ok(Self { rules })
    }

    /// 检查原始文本，发现问题时返回带行号的错误
    pub fn check(&self, text: &str) -> AppResult<()> {
        for rule in &self.rules {
            if let Some(offset) = rule.first_violation(text) {
                let line = line_of(text, offset);
                debug!("预检规则 {} 在第 {} 行失败", rule.name, line);
                return Err(AppError::syntax(rule.message, line));
            }
        }
        Ok(())
    }
}

/// 未加空格的 `<` / `>`（`<br>` 与行首的续行符除外）
fn unspaced_angle_bracket(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split('\n') {
        let bytes = line.as_bytes();
        let marker = line.len() - line.trim_start_matches(' ').len();
        for (i, &b) in bytes.iter().enumerate() {
            if b != b'<' && b != b'>' {
                continue;
            }
            let in_break = line[i..].starts_with("<br>") || line[..=i].ends_with("<br>");
            let continuation = b == b'>' && i == marker;
            if in_break || continuation {
                continue;
            }
            let spaced = |c: Option<&u8>| c.map_or(true, |c| c.is_ascii_whitespace());
            let before = if i == 0 { None } else { bytes.get(i - 1) };
            if !spaced(before) || !spaced(bytes.get(i + 1)) {
                return Some(offset + i);
            }
        }
        offset += line.len() + 1;
    }
    None
}

/// 标识符命令参数中的空格
fn spaced_identifier(text: &str) -> Option<usize> {
    IDENTIFIER_COMMANDS
        .iter()
        .flat_map(|command| command_arguments(text, command))
        .filter_map(|range| text[range.clone()].find(' ').map(|rel| range.start + rel))
        .min()
}

/// 公式内容紧贴定界符的空格，每个公式单独检查
fn space_inside_fence(text: &str) -> Option<usize> {
    math_fences(text).into_iter().find_map(|span| {
        let body = &text[span.body.clone()];
        if body.starts_with(' ') {
            Some(span.body.start)
        } else if body.ends_with(' ') {
            Some(span.body.end - 1)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of_error(text: &str) -> Option<usize> {
        match Preflight::new().unwrap().check(text) {
            Ok(()) => None,
            Err(AppError::Syntax { line, .. }) => Some(line),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clean_document_passes() {
        let text = "-------\ntype: MC\nprompt: Is $x < y$ true?\n> second line <br> third\ncorrect: $a + b$\n";
        assert_eq!(line_of_error(text), None);
    }

    #[test]
    fn test_tab_reported_with_line() {
        assert_eq!(line_of_error("-------\ntype: TF\nprompt:\tbad\n"), Some(3));
    }

    #[test]
    fn test_unspaced_angle_bracket() {
        assert_eq!(line_of_error("-------\nprompt: $x<y$\n"), Some(2));
        assert_eq!(line_of_error("-------\nprompt: a\n>continued\n"), None);
    }

    #[test]
    fn test_forbidden_commands() {
        assert_eq!(line_of_error("prompt: \\mbox{speed}\n"), Some(1));
        assert_eq!(line_of_error("\n\nprompt: $\\textrm{v}$\n"), Some(3));
        assert_eq!(line_of_error("\\newcommand{\\R}{\\mathbb{R}}\n"), Some(1));
        assert_eq!(line_of_error("x\n\\def\\R{1}\n"), Some(2));
    }

    #[test]
    fn test_spaced_identifier() {
        assert_eq!(line_of_error("prompt: $\\mathbf{unit vector}$\n"), Some(1));
        assert_eq!(line_of_error("prompt: $\\mathrm{unit vector}$\n"), None);
    }

    #[test]
    fn test_space_inside_fence_each_fence_checked() {
        assert_eq!(line_of_error("prompt: $x$ and\nmore $y $\n"), Some(2));
        assert_eq!(line_of_error("prompt: $ x$\n"), Some(1));
    }
}
