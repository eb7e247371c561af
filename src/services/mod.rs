//! 业务能力层（Services Layer）
//!
//! 每个服务只做一件事，彼此之间不直接调用（题目构建器除外，它持有问题生成器）。
//!
//! - `segmenter`：全文切分为段落、段落切分为句子
//! - `candidate_extractor`：提取候选答案词
//! - `phraser` / `llm_service`：把"答案 + 上下文"变成问句
//! - `item_builder`：构建单道选择题或填空题
//! - `document_extractor` / `source_loader`：上传文档和请求内容的解析
//! - `exporter`：导出 TXT / DOCX / PDF

pub mod candidate_extractor;
pub mod document_extractor;
pub mod exporter;
pub mod item_builder;
pub mod llm_service;
pub mod phraser;
pub mod segmenter;
pub mod source_loader;

pub use candidate_extractor::CandidateIndex;
pub use document_extractor::DocumentExtractor;
pub use item_builder::ItemBuilder;
pub use llm_service::LlmService;
pub use phraser::{QuestionPhraser, TemplatePhraser};
