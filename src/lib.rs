//! # Quiz Forge
//!
//! 从一段文本（或上传的 PDF / DOCX / PPTX / TXT 文档）自动生成多个版本的测验
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只处理一件事
//! - `segmenter` - 段落与句子切分
//! - `CandidateIndex` - 候选答案词索引
//! - `QuestionPhraser` - 问题生成能力（`LlmService` / `TemplatePhraser`）
//! - `ItemBuilder` - 构建单道选择题或填空题
//! - `DocumentExtractor` / `exporter` - 文档解析与导出
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一个版本"的完整生成流程
//! - `InstanceCtx` - 上下文封装（版本号 + 题目数 + 题型）
//! - `VarietySelector` - 段落选择状态机（select → extract → build → commit / reject）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/quiz_generator` - 一次请求的全部版本
//! - `orchestrator/server` - 应用生命周期和 HTTP 服务
//!
//! ### ④ 接口层（API）
//! - `api/` - axum 路由：生成、导出、健康检查
//!
//! ## 模块结构

pub mod api;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{GenerationRequest, QuestionItem, QuizInstance};
pub use orchestrator::{App, QuizGenerator};
pub use workflow::{InstanceCtx, VarietySelector};
