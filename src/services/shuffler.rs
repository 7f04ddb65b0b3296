//! 答案随机排序服务 - 业务能力层
//!
//! 只打乱选择题与选词填空的答案顺序，(标签, 内容) 成对移动

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::kind::QuestionKind;
use crate::models::record::QuestionRecord;

/// 答案打乱器
pub struct AnswerShuffler {
    rng: StdRng,
}

impl AnswerShuffler {
    /// 指定种子时结果可复现，否则使用系统熵
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// 原地打乱适用题型的答案
    pub fn shuffle_all(&mut self, records: &mut [QuestionRecord]) {
        for record in records.iter_mut() {
            let shuffled = QuestionKind::from_tag(&record.kind_tag)
                .map(QuestionKind::is_shuffled)
                .unwrap_or(false);
            if shuffled {
                record.answers.shuffle(&mut self.rng);
            }
        }
    }
}
