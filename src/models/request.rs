//! HTTP 请求 / 响应负载

use serde::{Deserialize, Serialize};

use crate::models::document::ExportFormat;
use crate::models::quiz::{QuestionItem, QuestionTypeMode, QuizInstance};

/// 内容来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// 直接粘贴的文本
    Text,
    /// base64 编码的上传文件
    File,
}

fn default_num_questions() -> usize {
    10
}

fn default_num_versions() -> usize {
    1
}

/// 生成测验请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizRequest {
    pub source_type: SourceType,
    #[serde(default)]
    pub content: String,
    /// `source_type = file` 时必填，扩展名决定解析方式
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    #[serde(default)]
    pub question_types: QuestionTypeMode,
    #[serde(default = "default_num_versions")]
    pub num_versions: usize,
}

/// 生成测验响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub quizzes: Vec<QuizInstance>,
}

/// 导出请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub quiz_data: Vec<QuestionItem>,
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateQuizRequest =
            serde_json::from_str(r#"{"source_type":"text","content":"hello"}"#).unwrap();
        assert_eq!(req.num_questions, 10);
        assert_eq!(req.num_versions, 1);
        assert_eq!(req.question_types, QuestionTypeMode::McqOnly);
        assert!(req.file_name.is_none());
    }

    #[test]
    fn test_unknown_source_type_is_rejected() {
        let result =
            serde_json::from_str::<GenerateQuizRequest>(r#"{"source_type":"url","content":"x"}"#);
        assert!(result.is_err());
    }
}
