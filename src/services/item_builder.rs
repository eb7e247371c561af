//! 题目构建服务 - 业务能力层
//!
//! 给定段落和选定的答案，构建一道选择题或填空题。
//! 只处理单道题，失败通过 `ItemBuildFailure` 交给调用方重试。

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::ItemBuildFailure;
use crate::models::{Chunk, ItemKind, QuestionItem};
use crate::services::phraser::QuestionPhraser;
use crate::services::segmenter::split_sentences;

/// 语料中候选词不足时的占位干扰项
pub const PLACEHOLDER_DISTRACTORS: [&str; 3] = [
    "Incorrect Option A",
    "Incorrect Option B",
    "Incorrect Option C",
];

/// 选项键，顺序即展示顺序
pub const OPTION_KEYS: [&str; 4] = ["A", "B", "C", "D"];

const DISTRACTOR_COUNT: usize = 3;

/// 问题生成器有时会带上的标签前缀
const QUESTION_LABEL: &str = "question:";

/// 题目构建器
pub struct ItemBuilder {
    phraser: Arc<dyn QuestionPhraser>,
    blank_marker: String,
}

impl ItemBuilder {
    pub fn new(phraser: Arc<dyn QuestionPhraser>, blank_marker: impl Into<String>) -> Self {
        Self {
            phraser,
            blank_marker: blank_marker.into(),
        }
    }

    pub fn phraser_name(&self) -> &str {
        self.phraser.name()
    }

    /// 构建一道题
    ///
    /// # 参数
    /// - `chunk`: 上下文段落
    /// - `answer`: 正确答案（段落中的候选词）
    /// - `kind`: 本次尝试的题型
    /// - `all_candidates`: 整篇语料的候选词，用于生成干扰项
    /// - `rng`: 随机源（洗牌与题目 ID）
    pub fn build_item<R: Rng + ?Sized>(
        &self,
        chunk: &Chunk,
        answer: &str,
        kind: ItemKind,
        all_candidates: &[String],
        rng: &mut R,
    ) -> Result<QuestionItem, ItemBuildFailure> {
        match kind {
            ItemKind::FillBlank => self.build_fill_blank(chunk, answer, rng),
            ItemKind::Mcq => self.build_mcq(chunk, answer, all_candidates, rng),
        }
    }

    fn build_fill_blank<R: Rng + ?Sized>(
        &self,
        chunk: &Chunk,
        answer: &str,
        rng: &mut R,
    ) -> Result<QuestionItem, ItemBuildFailure> {
        let containing: Vec<&str> = split_sentences(&chunk.text)
            .into_iter()
            .filter(|sentence| sentence.contains(answer))
            .collect();

        if containing.is_empty() {
            return Err(ItemBuildFailure::NoContainingSentence {
                answer: answer.to_string(),
            });
        }

        // 答案在句子里只出现一次，挖空后才不会在题干里泄露
        let sentence = containing
            .into_iter()
            .find(|sentence| sentence.matches(answer).count() == 1)
            .ok_or_else(|| ItemBuildFailure::RepeatedAnswer {
                answer: answer.to_string(),
            })?;

        let question_text = sentence.replacen(answer, &self.blank_marker, 1);

        Ok(QuestionItem::FillBlank {
            id: new_item_id(rng),
            question_text,
            correct_answer: answer.to_string(),
        })
    }

    fn build_mcq<R: Rng + ?Sized>(
        &self,
        chunk: &Chunk,
        answer: &str,
        all_candidates: &[String],
        rng: &mut R,
    ) -> Result<QuestionItem, ItemBuildFailure> {
        let raw = self.phraser.phrase_question(answer, &chunk.text)?;
        let question_text = strip_question_label(&raw);
        if question_text.is_empty() {
            return Err(ItemBuildFailure::EmptyQuestionText);
        }

        let mut distractors: Vec<String> = all_candidates
            .iter()
            .filter(|candidate| candidate.as_str() != answer)
            .cloned()
            .collect();

        let missing = DISTRACTOR_COUNT.saturating_sub(distractors.len());
        if missing > 0 {
            debug!("候选词不足，补充 {} 个占位干扰项", missing);
            distractors.extend(
                PLACEHOLDER_DISTRACTORS
                    .iter()
                    .take(missing)
                    .map(|s| s.to_string()),
            );
        }

        distractors.shuffle(rng);
        let mut option_texts: Vec<String> =
            distractors.into_iter().take(DISTRACTOR_COUNT).collect();
        option_texts.push(answer.to_string());
        option_texts.shuffle(rng);

        let options: BTreeMap<String, String> = OPTION_KEYS
            .iter()
            .map(|key| key.to_string())
            .zip(option_texts)
            .collect();

        Ok(QuestionItem::Mcq {
            id: new_item_id(rng),
            question_text,
            options,
            correct_answer: answer.to_string(),
        })
    }
}

/// 去掉开头的 `question:` 标签（不区分大小写）和首尾空白
pub fn strip_question_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_label = match trimmed.get(..QUESTION_LABEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(QUESTION_LABEL) => {
            &trimmed[QUESTION_LABEL.len()..]
        }
        _ => trimmed,
    };
    without_label.trim().to_string()
}

/// 由注入的随机源生成 UUID，固定种子时可复现
pub fn new_item_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}
