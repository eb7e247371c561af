//! 问题生成器（phraser）- 业务能力层
//!
//! 给定答案和上下文段落，返回一句自然语言问题。进程启动时创建一次，
//! 以 `Arc<dyn QuestionPhraser>` 的形式注入生成器，所有请求共享。

use crate::error::PhraserError;
use crate::services::segmenter::split_sentences;

/// 问题生成器
///
/// 调用是同步的，可能很慢，也可能失败；失败只影响当前这一次尝试。
pub trait QuestionPhraser: Send + Sync {
    fn phrase_question(&self, answer: &str, context: &str) -> Result<String, PhraserError>;

    /// 用于日志显示的名称
    fn name(&self) -> &str;
}

/// 离线模板生成器
///
/// 找到包含答案的句子，把答案遮住后问"哪个词能补全这句话"。
pub struct TemplatePhraser {
    mask: String,
}

impl TemplatePhraser {
    pub fn new(mask: impl Into<String>) -> Self {
        Self { mask: mask.into() }
    }
}

impl Default for TemplatePhraser {
    fn default() -> Self {
        Self::new("___")
    }
}

impl QuestionPhraser for TemplatePhraser {
    fn phrase_question(&self, answer: &str, context: &str) -> Result<String, PhraserError> {
        if answer.is_empty() {
            return Err(PhraserError::EmptyResponse);
        }

        let question = match split_sentences(context)
            .into_iter()
            .find(|sentence| sentence.contains(answer))
        {
            Some(sentence) => format!(
                "Which term best completes the statement: \"{}\"?",
                sentence.trim().replace(answer, &self.mask)
            ),
            None => format!(
                "Which term is discussed in the passage: \"{}\"?",
                context.replace(answer, &self.mask)
            ),
        };

        Ok(question)
    }

    fn name(&self) -> &str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_masks_answer_in_its_sentence() {
        let phraser = TemplatePhraser::default();
        let question = phraser
            .phrase_question("Rome", "Cities grow. Rome was not built in a day. Paris was.")
            .unwrap();

        assert_eq!(
            question,
            "Which term best completes the statement: \"___ was not built in a day.\"?"
        );
        assert!(!question.contains("Rome"));
    }

    #[test]
    fn test_template_falls_back_to_whole_passage() {
        let phraser = TemplatePhraser::new("[?]");
        let question = phraser.phrase_question("Zeus", "no match here").unwrap();
        assert!(question.contains("no match here"));
    }

    #[test]
    fn test_template_rejects_empty_answer() {
        let phraser = TemplatePhraser::default();
        assert!(phraser.phrase_question("", "context").is_err());
    }
}
