pub mod chunk;
pub mod document;
pub mod quiz;
pub mod request;

pub use chunk::Chunk;
pub use document::{DocumentKind, ExportFormat};
pub use quiz::{GenerationRequest, ItemKind, QuestionItem, QuestionTypeMode, QuizInstance};
pub use request::{ExportRequest, GenerateQuizRequest, GenerateQuizResponse, SourceType};
