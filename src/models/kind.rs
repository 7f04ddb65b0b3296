use phf::{phf_map, phf_set};

/// 题型枚举
///
/// 与 Blackboard 上传格式中的题型标签一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// 单选题
    SingleChoice,
    /// 多选题
    MultiChoice,
    /// 判断题
    TrueFalse,
    /// 论述题
    Essay,
    /// 排序题
    Ordering,
    /// 匹配题
    Matching,
    /// 文件上传题
    FileUpload,
    /// 数值题
    Numeric,
    /// 简答题
    ShortResponse,
    /// 观点量表题
    Opinion,
    /// 选词填空（乱序句子）
    JumbledSentence,
    /// 多空填空
    FillInBlanks,
}

static TAGS: phf::Map<&'static str, QuestionKind> = phf_map! {
    "MC" => QuestionKind::SingleChoice,
    "MA" => QuestionKind::MultiChoice,
    "TF" => QuestionKind::TrueFalse,
    "ESS" => QuestionKind::Essay,
    "ORD" => QuestionKind::Ordering,
    "MAT" => QuestionKind::Matching,
    "FIL" => QuestionKind::FileUpload,
    "NUM" => QuestionKind::Numeric,
    "SR" => QuestionKind::ShortResponse,
    "OP" => QuestionKind::Opinion,
    "JUMBLED_SENTENCE" => QuestionKind::JumbledSentence,
    "FIB_PLUS" => QuestionKind::FillInBlanks,
};

/// 可以出现在答案行中的标签（去掉部分得分标注之后）
static ANSWER_LABELS: phf::Set<&'static str> = phf_set! {
    "correct",
    "incorrect",
    "answer",
    "match_a",
    "match_b",
    "example",
    "tolerance",
    "variable",
    "q_word",
    "q_phrase",
    "notes",
};

/// 备注标签，不参与题型校验
pub const NOTES_LABEL: &str = "notes";

impl QuestionKind {
    /// 所有题型，按标签顺序
    pub const ALL: [QuestionKind; 12] = [
        QuestionKind::SingleChoice,
        QuestionKind::MultiChoice,
        QuestionKind::TrueFalse,
        QuestionKind::Essay,
        QuestionKind::Ordering,
        QuestionKind::Matching,
        QuestionKind::FileUpload,
        QuestionKind::Numeric,
        QuestionKind::ShortResponse,
        QuestionKind::Opinion,
        QuestionKind::JumbledSentence,
        QuestionKind::FillInBlanks,
    ];

    /// 从题型标签解析
    pub fn from_tag(tag: &str) -> Option<Self> {
        TAGS.get(tag).copied()
    }

    /// 题型标签
    pub fn tag(self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "MC",
            QuestionKind::MultiChoice => "MA",
            QuestionKind::TrueFalse => "TF",
            QuestionKind::Essay => "ESS",
            QuestionKind::Ordering => "ORD",
            QuestionKind::Matching => "MAT",
            QuestionKind::FileUpload => "FIL",
            QuestionKind::Numeric => "NUM",
            QuestionKind::ShortResponse => "SR",
            QuestionKind::Opinion => "OP",
            QuestionKind::JumbledSentence => "JUMBLED_SENTENCE",
            QuestionKind::FillInBlanks => "FIB_PLUS",
        }
    }

    /// 选择题（选项互斥，文档中用列表展示）
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultiChoice)
    }

    /// 是否允许部分得分标注
    pub fn allows_partial_credit(self) -> bool {
        self.is_choice()
    }

    /// 随机模式下是否打乱答案顺序
    pub fn is_shuffled(self) -> bool {
        matches!(
            self,
            QuestionKind::SingleChoice | QuestionKind::MultiChoice | QuestionKind::JumbledSentence
        )
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// 标签（已去掉部分得分标注）是否可识别
pub fn is_known_label(key: &str) -> bool {
    ANSWER_LABELS.contains(key)
}
