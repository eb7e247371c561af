//! 多样性选择器 - 流程层
//!
//! 核心职责：为一个版本逐次选择"段落 + 答案 + 题型"，保证同一版本内
//! 不重复使用段落（除非所有段落都已用过），并驱动失败重试。
//!
//! 单次尝试是一个显式的小状态机：
//!
//! ```text
//! Selecting → Extracting → Building → Committed
//!                 │            │
//!                 └────────────┴────→ Rejected
//! ```
//!
//! 随机源由调用方注入，固定种子时整个过程可复现。

use std::collections::BTreeSet;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::error::ItemBuildFailure;
use crate::models::{Chunk, ItemKind, QuestionItem, QuestionTypeMode};
use crate::services::candidate_extractor::CandidateIndex;
use crate::services::item_builder::ItemBuilder;
use crate::utils::truncate_text;
use crate::workflow::instance_ctx::InstanceCtx;

/// 单次尝试的状态
#[derive(Debug)]
pub enum SelectionState {
    /// 选择段落
    Selecting,
    /// 从段落中取候选词并决定答案和题型
    Extracting { chunk_index: usize },
    /// 构建题目
    Building {
        chunk_index: usize,
        answer: String,
        kind: ItemKind,
    },
    /// 终态：题目被接受
    Committed(QuestionItem),
    /// 终态：本次尝试被丢弃，不计入题目数
    Rejected {
        chunk_index: usize,
        reason: ItemBuildFailure,
    },
}

/// 被丢弃的尝试
#[derive(Debug)]
pub struct Rejection {
    pub chunk_index: usize,
    pub reason: ItemBuildFailure,
}

/// 选择器失败
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("没有可用的段落")]
    EmptyCorpus,
    #[error("尝试 {attempts} 次后只生成了 {committed} 道题")]
    BudgetExhausted { attempts: usize, committed: usize },
    #[error("超过截止时间: 尝试 {attempts} 次, 生成了 {committed} 道题")]
    DeadlineExceeded { attempts: usize, committed: usize },
}

/// 段落使用记录
///
/// 同一版本内，所有段落都用过一次之前不会重复选择；全部用完后清空重来。
#[derive(Debug, Clone)]
pub struct ChunkTracker {
    total: usize,
    used: BTreeSet<usize>,
}

impl ChunkTracker {
    /// 段落数为 0 时返回 `None`
    pub fn new(total: usize) -> Option<Self> {
        (total > 0).then(|| Self {
            total,
            used: BTreeSet::new(),
        })
    }

    /// 在未使用的段落中均匀随机选一个并标记为已使用
    pub fn select<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.used.len() >= self.total {
            self.used.clear();
        }

        let unused: Vec<usize> = (0..self.total)
            .filter(|index| !self.used.contains(index))
            .collect();
        let chunk_index = unused[rng.gen_range(0..unused.len())];
        self.used.insert(chunk_index);
        chunk_index
    }

    pub fn is_used(&self, chunk_index: usize) -> bool {
        self.used.contains(&chunk_index)
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }
}

/// 单个版本的生成结果
#[derive(Debug, Clone)]
pub struct InstanceOutcome {
    pub items: Vec<QuestionItem>,
    pub attempts: usize,
    pub rejected: usize,
}

/// 多样性选择器
///
/// - 只依赖业务能力（候选词索引、题目构建器）
/// - 每个版本一个实例，互不共享使用记录
/// - 题型、题目数、尝试上限和截止时间都取自 `InstanceCtx`
pub struct VarietySelector<'a> {
    chunks: &'a [Chunk],
    candidates: &'a CandidateIndex,
    builder: &'a ItemBuilder,
    ctx: &'a InstanceCtx,
    tracker: ChunkTracker,
}

impl<'a> VarietySelector<'a> {
    /// 段落为空时返回 `EmptyCorpus`
    pub fn new(
        chunks: &'a [Chunk],
        candidates: &'a CandidateIndex,
        builder: &'a ItemBuilder,
        ctx: &'a InstanceCtx,
    ) -> Result<Self, SelectionError> {
        let tracker = ChunkTracker::new(chunks.len()).ok_or(SelectionError::EmptyCorpus)?;
        Ok(Self {
            chunks,
            candidates,
            builder,
            ctx,
            tracker,
        })
    }

    /// 当前的段落使用记录
    pub fn tracker(&self) -> &ChunkTracker {
        &self.tracker
    }

    /// 从当前状态前进一步
    ///
    /// 终态原样返回。
    pub fn step<R: Rng + ?Sized>(&mut self, state: SelectionState, rng: &mut R) -> SelectionState {
        match state {
            SelectionState::Selecting => SelectionState::Extracting {
                chunk_index: self.tracker.select(rng),
            },
            SelectionState::Extracting { chunk_index } => {
                let candidates = self.candidates.for_chunk(chunk_index);
                if candidates.is_empty() {
                    return SelectionState::Rejected {
                        chunk_index,
                        reason: ItemBuildFailure::NoCandidates { chunk_index },
                    };
                }
                let answer = candidates[rng.gen_range(0..candidates.len())].clone();
                let kind = resolve_kind(self.ctx.mode, rng);
                SelectionState::Building {
                    chunk_index,
                    answer,
                    kind,
                }
            }
            SelectionState::Building {
                chunk_index,
                answer,
                kind,
            } => {
                let chunk = &self.chunks[chunk_index];
                match self.builder.build_item(
                    chunk,
                    &answer,
                    kind,
                    self.candidates.corpus_wide(),
                    rng,
                ) {
                    Ok(item) => SelectionState::Committed(item),
                    Err(reason) => SelectionState::Rejected {
                        chunk_index,
                        reason,
                    },
                }
            }
            terminal => terminal,
        }
    }

    /// 从 `Selecting` 开始执行一次完整尝试，直到进入终态
    pub fn attempt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<QuestionItem, Rejection> {
        let mut state = SelectionState::Selecting;
        loop {
            state = match self.step(state, rng) {
                SelectionState::Committed(item) => return Ok(item),
                SelectionState::Rejected {
                    chunk_index,
                    reason,
                } => {
                    return Err(Rejection {
                        chunk_index,
                        reason,
                    })
                }
                next => next,
            };
        }
    }

    /// 生成一个版本的全部题目
    ///
    /// 被丢弃的尝试不计入题目数；尝试次数超过 `ctx.max_attempts` 时整体失败。
    /// 每次尝试前检查截止时间，过期后立即停止，不再调用问题生成器。
    pub fn build_instance<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
    ) -> Result<InstanceOutcome, SelectionError> {
        let ctx = self.ctx;
        let mut items = Vec::with_capacity(ctx.num_questions);
        let mut attempts = 0;
        let mut rejected = 0;

        while items.len() < ctx.num_questions {
            if attempts >= ctx.max_attempts {
                return Err(SelectionError::BudgetExhausted {
                    attempts,
                    committed: items.len(),
                });
            }
            if ctx.is_expired() {
                return Err(SelectionError::DeadlineExceeded {
                    attempts,
                    committed: items.len(),
                });
            }
            attempts += 1;

            match self.attempt(rng) {
                Ok(item) => {
                    debug!(
                        "{} ✓ 第 {} 题 ({}): {}",
                        ctx,
                        items.len() + 1,
                        item.kind(),
                        truncate_text(item.question_text(), 60)
                    );
                    items.push(item);
                }
                Err(rejection) => {
                    rejected += 1;
                    debug!(
                        "{} 段落 #{} 尝试失败: {}",
                        ctx, rejection.chunk_index, rejection.reason
                    );
                }
            }
        }

        Ok(InstanceOutcome {
            items,
            attempts,
            rejected,
        })
    }
}

/// 决定本次尝试的题型；`Mixed` 每次尝试掷一次硬币
fn resolve_kind<R: Rng + ?Sized>(mode: QuestionTypeMode, rng: &mut R) -> ItemKind {
    match mode {
        QuestionTypeMode::McqOnly => ItemKind::Mcq,
        QuestionTypeMode::FillOnly => ItemKind::FillBlank,
        QuestionTypeMode::Mixed => {
            if rng.gen_bool(0.5) {
                ItemKind::Mcq
            } else {
                ItemKind::FillBlank
            }
        }
    }
}
