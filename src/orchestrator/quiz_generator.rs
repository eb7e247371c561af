//! 测验生成器 - 编排层
//!
//! ## 职责
//!
//! 一次生成请求的入口：切分段落、建立候选词索引（只做一次），然后逐个版本
//! 交给 `VarietySelector` 生成题目。
//!
//! - 版本之间顺序生成，每个版本从请求的随机源派生一个独立种子
//! - 任意一个版本失败，整个请求失败（不返回部分结果）
//! - 单道题的失败只在版本内部重试，不会跨版本传播

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::error::GenerationError;
use crate::models::{GenerationRequest, QuizInstance};
use crate::services::candidate_extractor::CandidateIndex;
use crate::services::item_builder::ItemBuilder;
use crate::services::segmenter;
use crate::utils::logging::{log_generation_start, log_version_complete};
use crate::workflow::{InstanceCtx, SelectionError, VarietySelector};

/// 测验生成器
pub struct QuizGenerator {
    builder: ItemBuilder,
    min_chunk_chars: usize,
    attempts_per_question: usize,
}

impl QuizGenerator {
    pub fn new(builder: ItemBuilder, min_chunk_chars: usize, attempts_per_question: usize) -> Self {
        Self {
            builder,
            min_chunk_chars,
            attempts_per_question,
        }
    }

    /// 当前使用的问题生成器名称
    pub fn phraser_name(&self) -> &str {
        self.builder.phraser_name()
    }

    /// 生成全部版本
    ///
    /// # 参数
    /// - `request`: 生成参数
    /// - `rng`: 随机源，固定种子时结果可复现
    ///
    /// # 返回
    /// 按版本号排列的测验列表
    pub fn generate<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<Vec<QuizInstance>, GenerationError> {
        self.generate_with_deadline(request, None, rng)
    }

    /// 在截止时间之前生成全部版本
    ///
    /// 每次尝试前检查 `deadline`，过期后不再调用问题生成器，返回
    /// `GenerationError::DeadlineExceeded`。
    pub fn generate_with_deadline<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        deadline: Option<Instant>,
        rng: &mut R,
    ) -> Result<Vec<QuizInstance>, GenerationError> {
        let chunks = segmenter::segment(&request.full_text, self.min_chunk_chars);
        if chunks.is_empty() {
            warn!("⚠️ 内容中没有超过 {} 个字符的段落", self.min_chunk_chars);
            return Err(GenerationError::EmptyCorpus {
                min_chunk_chars: self.min_chunk_chars,
            });
        }

        let candidates = CandidateIndex::build(&chunks);
        log_generation_start(chunks.len(), request.num_questions, request.num_versions);

        let mut quizzes = Vec::with_capacity(request.num_versions);
        for version in 1..=request.num_versions {
            let ctx = InstanceCtx::new(
                version,
                request.num_questions,
                request.question_type_mode,
                self.attempts_per_question,
            )
            .with_deadline(deadline);
            let mut version_rng = ChaCha8Rng::seed_from_u64(rng.gen());

            let outcome = VarietySelector::new(&chunks, &candidates, &self.builder, &ctx)
                .and_then(|selector| selector.build_instance(&mut version_rng))
            .map_err(|e| {
                warn!("{} ❌ 生成失败: {}", ctx, e);
                match e {
                    SelectionError::EmptyCorpus => GenerationError::EmptyCorpus {
                        min_chunk_chars: self.min_chunk_chars,
                    },
                    SelectionError::BudgetExhausted {
                        attempts,
                        committed,
                    } => GenerationError::InsufficientContent {
                        version,
                        attempts,
                        committed,
                        requested: request.num_questions,
                    },
                    SelectionError::DeadlineExceeded { committed, .. } => {
                        GenerationError::DeadlineExceeded {
                            version,
                            committed,
                            requested: request.num_questions,
                        }
                    }
                }
            })?;

            log_version_complete(
                version,
                outcome.items.len(),
                outcome.attempts,
                outcome.rejected,
            );
            quizzes.push(QuizInstance {
                version,
                questions: outcome.items,
            });
        }

        Ok(quizzes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhraserError;
    use crate::services::phraser::{QuestionPhraser, TemplatePhraser};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const PASSAGE: &str = "The Roman Republic expanded across Italy during the fourth century. \
        Carthage challenged Rome for control of Sicily and the western Mediterranean. \
        Hannibal crossed the Alps with elephants before the battle at Cannae.";

    fn generator() -> QuizGenerator {
        QuizGenerator::new(
            ItemBuilder::new(Arc::new(TemplatePhraser::default()), "___"),
            150,
            20,
        )
    }

    fn request(text: &str, num_questions: usize, num_versions: usize) -> GenerationRequest {
        GenerationRequest {
            full_text: text.to_string(),
            num_questions,
            question_type_mode: crate::models::QuestionTypeMode::Mixed,
            num_versions,
        }
    }

    #[test]
    fn test_generates_each_version() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let quizzes = generator()
            .generate(&request(PASSAGE, 4, 3), &mut rng)
            .unwrap();

        assert_eq!(quizzes.len(), 3);
        for (i, quiz) in quizzes.iter().enumerate() {
            assert_eq!(quiz.version, i + 1);
            assert_eq!(quiz.questions.len(), 4);
        }
    }

    #[test]
    fn test_short_text_is_empty_corpus() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = generator().generate(&request("Too short.", 1, 1), &mut rng);
        assert!(matches!(
            result,
            Err(GenerationError::EmptyCorpus { min_chunk_chars: 150 })
        ));
    }

    #[test]
    fn test_no_candidates_is_insufficient_content() {
        let text = "lowercase only ".repeat(20);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        match generator().generate(&request(&text, 2, 1), &mut rng) {
            Err(GenerationError::InsufficientContent {
                version,
                attempts,
                committed,
                requested,
            }) => {
                assert_eq!(version, 1);
                assert_eq!(attempts, 40);
                assert_eq!(committed, 0);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_same_seed_same_quizzes() {
        let generator = generator();
        let first = generator
            .generate(&request(PASSAGE, 5, 2), &mut ChaCha8Rng::seed_from_u64(7))
            .unwrap();
        let second = generator
            .generate(&request(PASSAGE, 5, 2), &mut ChaCha8Rng::seed_from_u64(7))
            .unwrap();
        assert_eq!(first, second);
    }

    struct SlowPhraser {
        calls: Arc<AtomicUsize>,
    }

    impl QuestionPhraser for SlowPhraser {
        fn phrase_question(&self, answer: &str, _context: &str) -> Result<String, PhraserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(format!("Which name fits {}?", answer.len()))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[test]
    fn test_deadline_stops_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = QuizGenerator::new(
            ItemBuilder::new(
                Arc::new(SlowPhraser {
                    calls: calls.clone(),
                }),
                "___",
            ),
            150,
            20,
        );
        let mut req = request(PASSAGE, 50, 2);
        req.question_type_mode = crate::models::QuestionTypeMode::McqOnly;
        let deadline = Instant::now() + Duration::from_millis(200);

        let result =
            generator.generate_with_deadline(&req, Some(deadline), &mut ChaCha8Rng::seed_from_u64(3));
        let calls_at_return = calls.load(Ordering::SeqCst);

        match result {
            Err(GenerationError::DeadlineExceeded {
                version, requested, ..
            }) => {
                assert_eq!(version, 1);
                assert_eq!(requested, 50);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(Instant::now() < deadline + Duration::from_millis(500));
        assert!(calls_at_return < 50);

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(calls.load(Ordering::SeqCst), calls_at_return);
    }
}
