use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 题型模式（请求参数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTypeMode {
    /// 只生成选择题
    #[default]
    McqOnly,
    /// 只生成填空题
    FillOnly,
    /// 每次尝试随机决定
    Mixed,
}

/// 单道题目的实际题型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Mcq,
    FillBlank,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Mcq => write!(f, "选择题"),
            ItemKind::FillBlank => write!(f, "填空题"),
        }
    }
}

/// 生成的题目
///
/// `id` 只在响应负载里用于前端引用，题目之间没有关联。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionItem {
    #[serde(rename = "mcq")]
    Mcq {
        id: String,
        question_text: String,
        /// 选项键 A-D 按字母序即展示顺序
        options: BTreeMap<String, String>,
        /// 正确答案的原文（不是选项键）
        correct_answer: String,
    },
    #[serde(rename = "fill_in_the_blank")]
    FillBlank {
        id: String,
        question_text: String,
        correct_answer: String,
    },
}

impl QuestionItem {
    pub fn id(&self) -> &str {
        match self {
            QuestionItem::Mcq { id, .. } | QuestionItem::FillBlank { id, .. } => id,
        }
    }

    pub fn question_text(&self) -> &str {
        match self {
            QuestionItem::Mcq { question_text, .. }
            | QuestionItem::FillBlank { question_text, .. } => question_text,
        }
    }

    pub fn correct_answer(&self) -> &str {
        match self {
            QuestionItem::Mcq { correct_answer, .. }
            | QuestionItem::FillBlank { correct_answer, .. } => correct_answer,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            QuestionItem::Mcq { .. } => ItemKind::Mcq,
            QuestionItem::FillBlank { .. } => ItemKind::FillBlank,
        }
    }
}

/// 一份完整的测验（一个版本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizInstance {
    /// 版本号，从 1 开始
    pub version: usize,
    pub questions: Vec<QuestionItem>,
}

/// 生成参数，一次生成调用期间不可变
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub full_text: String,
    pub num_questions: usize,
    pub question_type_mode: QuestionTypeMode,
    pub num_versions: usize,
}
