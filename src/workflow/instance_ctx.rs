//! 版本生成上下文
//!
//! 封装"我正在生成第几个版本、要几道题、什么题型"这一信息

use std::fmt::Display;
use std::time::Instant;

use crate::models::QuestionTypeMode;

/// 版本生成上下文
#[derive(Debug, Clone)]
pub struct InstanceCtx {
    /// 版本号（从 1 开始）
    pub version: usize,

    /// 目标题目数
    pub num_questions: usize,

    /// 题型模式
    pub mode: QuestionTypeMode,

    /// 本版本的尝试上限
    pub max_attempts: usize,

    /// 截止时间，过了之后不再开始新的尝试
    pub deadline: Option<Instant>,
}

impl InstanceCtx {
    /// 创建新的版本上下文
    ///
    /// 尝试上限 = 题目数 × 每题尝试次数
    pub fn new(
        version: usize,
        num_questions: usize,
        mode: QuestionTypeMode,
        attempts_per_question: usize,
    ) -> Self {
        Self {
            version,
            num_questions,
            mode,
            max_attempts: num_questions.saturating_mul(attempts_per_question),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// 是否已过截止时间
    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl Display for InstanceCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[版本 #{} 题目数#{} 题型#{:?}]",
            self.version, self.num_questions, self.mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_attempt_budget() {
        let ctx = InstanceCtx::new(1, 5, QuestionTypeMode::Mixed, 20);
        assert_eq!(ctx.max_attempts, 100);
        assert!(!ctx.is_expired());
    }

    #[test]
    fn test_deadline() {
        let past = Instant::now() - Duration::from_millis(1);
        let ctx = InstanceCtx::new(1, 5, QuestionTypeMode::McqOnly, 20).with_deadline(Some(past));
        assert!(ctx.is_expired());

        let future = Instant::now() + Duration::from_secs(60);
        let ctx = ctx.with_deadline(Some(future));
        assert!(!ctx.is_expired());
    }
}
