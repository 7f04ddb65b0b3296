/// 一条答案（标签, 内容），顺序与源文件一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub label: String,
    pub value: String,
}

impl Answer {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// 解析后的标签
    pub fn parsed_label(&self) -> AnswerLabel<'_> {
        AnswerLabel::parse(&self.label)
    }
}

/// 一道题的原始记录
///
/// 解析器创建后不再修改，变体展开时为每个变体深拷贝一份
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionRecord {
    /// 题型标签，例如 `MC`
    pub kind_tag: String,
    /// 题干
    pub prompt: String,
    /// 答案列表
    pub answers: Vec<Answer>,
    /// 在源文件中的序号（从 1 开始，仅用于诊断）
    pub number: usize,
}

impl QuestionRecord {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }
}

/// 拆分后的答案标签
///
/// `correct (50%)` → key `correct`, credit `50%`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerLabel<'a> {
    pub key: &'a str,
    /// 括号中的部分得分标注
    pub credit: Option<&'a str>,
}

impl<'a> AnswerLabel<'a> {
    pub fn parse(label: &'a str) -> Self {
        let label = label.trim();
        if let (Some(open), true) = (label.find('('), label.ends_with(')')) {
            return Self {
                key: label[..open].trim(),
                credit: Some(label[open + 1..label.len() - 1].trim()),
            };
        }
        Self {
            key: label,
            credit: None,
        }
    }
}
