//! 导入文件渲染服务 - 业务能力层
//!
//! 每道题输出一行，字段之间用制表符分隔（Blackboard 批量上传格式）。
//! Blackboard 自身用 `$$` 表示公式，因此 `$$` 统一替换为 MathJax 配置的标记。

use regex::{Captures, Regex};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::typed::TypedQuestion;

/// 导入文件渲染器
pub struct ImportRenderer {
    config: Config,
    figure: Regex,
}

impl ImportRenderer {
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            config: config.clone(),
            figure: Regex::new(r"@\{(.*?)\}@")?,
        })
    }

    /// 渲染全部题目，每道题一行
    pub fn render(&self, questions: &[TypedQuestion]) -> String {
        let mut out = String::new();
        for question in questions {
            out.push_str(&self.render_line(question));
            out.push('\n');
        }
        out
    }

    /// 渲染一道题
    pub fn render_line(&self, question: &TypedQuestion) -> String {
        let mut fields = question.import_fields();
        if let Some(prompt) = fields.get_mut(1) {
            prompt.push_str(&self.config.prompt_spacer);
        }

        // 图片只能在 LMS 中手动插入，这里留下占位文字
        let fields: Vec<String> = fields
            .iter()
            .map(|field| {
                self.figure
                    .replace_all(field, |caps: &Captures| self.config.figure_marker_for(&caps[1]))
                    .replace('\t', " ")
            })
            .collect();

        fields
            .join("\t")
            .replace("$$", &self.config.display_math_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::kind::QuestionKind;
    use crate::models::typed::{Choice, QuestionBody};

    fn renderer() -> ImportRenderer {
        ImportRenderer::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_true_false_line() {
        let question = TypedQuestion {
            kind: QuestionKind::TrueFalse,
            prompt: "The sky is blue".to_string(),
            body: QuestionBody::TrueFalse(true),
            notes: None,
        };
        assert_eq!(
            renderer().render_line(&question),
            "TF\tThe sky is blue<p></p>\ttrue"
        );
    }

    #[test]
    fn test_display_math_and_figures() {
        let question = TypedQuestion {
            kind: QuestionKind::MultiChoice,
            prompt: "Solve $$x^2 = 4$$ @{fig/parabola.png}@".to_string(),
            body: QuestionBody::Choices(vec![
                Choice {
                    correct: true,
                    value: "$2$".to_string(),
                    credit: Some("50%".to_string()),
                },
                Choice {
                    correct: true,
                    value: "$-2$".to_string(),
                    credit: None,
                },
            ]),
            notes: Some("not exported".to_string()),
        };
        let line = renderer().render_line(&question);
        assert_eq!(
            line,
            "MA\tSolve ~~x^2 = 4~~ <b>[INSERT FIGURE HERE: fig/parabola.png]</b><p></p>\t$2$\tcorrect\t$-2$\tcorrect"
        );
        assert!(!line.contains("$$"));
        assert_eq!(line.split('\t').count(), 6);
    }

    #[test]
    fn test_tabs_inside_fields_become_spaces() {
        let question = TypedQuestion {
            kind: QuestionKind::MultiChoice,
            prompt: "Pick\tone".to_string(),
            body: QuestionBody::Choices(vec![
                Choice {
                    correct: true,
                    value: "a\tb".to_string(),
                    credit: None,
                },
                Choice {
                    correct: false,
                    value: "c".to_string(),
                    credit: None,
                },
            ]),
            notes: None,
        };
        let line = renderer().render_line(&question);
        assert_eq!(line, "MC\tPick one<p></p>\ta b\tcorrect\tc\tincorrect");
        assert_eq!(line.split('\t').count(), 5);
    }

    #[test]
    fn test_render_one_line_per_question() {
        let question = TypedQuestion {
            kind: QuestionKind::FileUpload,
            prompt: "Upload".to_string(),
            body: QuestionBody::PromptOnly,
            notes: None,
        };
        let out = renderer().render(&[question.clone(), question]);
        assert_eq!(out, "FIL\tUpload<p></p>\nFIL\tUpload<p></p>\n");
    }
}
