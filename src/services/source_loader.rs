//! 内容来源解析 - 业务能力层
//!
//! 校验生成请求，并把"粘贴文本"或"base64 文件"统一转换成 `GenerationRequest`。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::{DocumentKind, GenerateQuizRequest, GenerationRequest, SourceType};
use crate::services::document_extractor::DocumentExtractor;

/// 校验题目数量和版本数量
pub fn validate_counts(request: &GenerateQuizRequest, config: &Config) -> AppResult<()> {
    if request.num_questions == 0 || request.num_questions > config.max_questions {
        return Err(ValidationError::QuestionCountOutOfRange {
            value: request.num_questions,
            max: config.max_questions,
        }
        .into());
    }
    if request.num_versions == 0 || request.num_versions > config.max_versions {
        return Err(ValidationError::VersionCountOutOfRange {
            value: request.num_versions,
            max: config.max_versions,
        }
        .into());
    }
    Ok(())
}

/// 取得请求对应的全文
///
/// # 返回
/// 文本模式直接返回内容；文件模式按扩展名解码并解析
pub fn resolve_source_text(
    request: &GenerateQuizRequest,
    config: &Config,
    extractor: &DocumentExtractor,
) -> AppResult<String> {
    if request.content.is_empty() {
        return Err(ValidationError::MissingContent.into());
    }

    match request.source_type {
        SourceType::Text => {
            let actual = request.content.chars().count();
            if actual > config.max_text_chars {
                return Err(ValidationError::TextTooLong {
                    limit: config.max_text_chars,
                    actual,
                }
                .into());
            }
            Ok(request.content.clone())
        }
        SourceType::File => {
            let file_name = request
                .file_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .ok_or(ValidationError::MissingFileName)?;

            let extension = DocumentKind::extension_of(file_name);
            let kind = DocumentKind::from_extension(extension.trim_start_matches('.'))
                .ok_or_else(|| ValidationError::UnsupportedFileType {
                    extension: extension.clone(),
                })?;

            let bytes = STANDARD
                .decode(request.content.trim())
                .map_err(|e| ValidationError::InvalidBase64(e.to_string()))?;
            debug!("📎 文件 {} 解码完成 ({} 字节)", file_name, bytes.len());

            extractor.extract_text(&bytes, kind)
        }
    }
}

/// 校验请求并构造生成参数
pub fn load_generation_request(
    request: &GenerateQuizRequest,
    config: &Config,
    extractor: &DocumentExtractor,
) -> AppResult<GenerationRequest> {
    validate_counts(request, config)?;
    let full_text = resolve_source_text(request, config, extractor)?;

    Ok(GenerationRequest {
        full_text,
        num_questions: request.num_questions,
        question_type_mode: request.question_types,
        num_versions: request.num_versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::QuestionTypeMode;

    fn request(source_type: SourceType, content: &str, file_name: Option<&str>) -> GenerateQuizRequest {
        GenerateQuizRequest {
            source_type,
            content: content.to_string(),
            file_name: file_name.map(str::to_string),
            num_questions: 5,
            question_types: QuestionTypeMode::Mixed,
            num_versions: 2,
        }
    }

    fn extractor() -> DocumentExtractor {
        DocumentExtractor::new(200)
    }

    #[test]
    fn test_text_source() {
        let config = Config::default();
        let req = request(SourceType::Text, "Paris is in France.", None);
        let generation = load_generation_request(&req, &config, &extractor()).unwrap();
        assert_eq!(generation.full_text, "Paris is in France.");
        assert_eq!(generation.num_versions, 2);
        assert_eq!(generation.question_type_mode, QuestionTypeMode::Mixed);
    }

    #[test]
    fn test_text_too_long() {
        let config = Config {
            max_text_chars: 10,
            ..Config::default()
        };
        let req = request(SourceType::Text, "this text is longer than ten", None);
        assert!(matches!(
            resolve_source_text(&req, &config, &extractor()),
            Err(AppError::Validation(ValidationError::TextTooLong { limit: 10, .. }))
        ));
    }

    #[test]
    fn test_empty_content() {
        let req = request(SourceType::Text, "", None);
        assert!(matches!(
            resolve_source_text(&req, &Config::default(), &extractor()),
            Err(AppError::Validation(ValidationError::MissingContent))
        ));
    }

    #[test]
    fn test_file_source_txt() {
        let encoded = STANDARD.encode("Rome was founded long ago.");
        let req = request(SourceType::File, &encoded, Some("notes.TXT"));
        let text = resolve_source_text(&req, &Config::default(), &extractor()).unwrap();
        assert_eq!(text, "Rome was founded long ago.");
    }

    #[test]
    fn test_file_source_errors() {
        let config = Config::default();
        let encoded = STANDARD.encode("whatever");

        let req = request(SourceType::File, &encoded, None);
        assert!(matches!(
            resolve_source_text(&req, &config, &extractor()),
            Err(AppError::Validation(ValidationError::MissingFileName))
        ));

        let req = request(SourceType::File, &encoded, Some("slides.key"));
        match resolve_source_text(&req, &config, &extractor()) {
            Err(AppError::Validation(ValidationError::UnsupportedFileType { extension })) => {
                assert_eq!(extension, ".key")
            }
            other => panic!("unexpected result {:?}", other),
        }

        let req = request(SourceType::File, "%%% not base64 %%%", Some("notes.txt"));
        assert!(matches!(
            resolve_source_text(&req, &config, &extractor()),
            Err(AppError::Validation(ValidationError::InvalidBase64(_)))
        ));
    }

    #[test]
    fn test_count_limits() {
        let config = Config::default();
        let mut req = request(SourceType::Text, "text", None);

        req.num_questions = 0;
        assert!(matches!(
            validate_counts(&req, &config),
            Err(AppError::Validation(ValidationError::QuestionCountOutOfRange { value: 0, .. }))
        ));

        req.num_questions = 100;
        req.num_versions = 11;
        assert!(matches!(
            validate_counts(&req, &config),
            Err(AppError::Validation(ValidationError::VersionCountOutOfRange { value: 11, max: 10 }))
        ));

        req.num_versions = 10;
        assert!(validate_counts(&req, &config).is_ok());
    }
}
