//! 错误类型
//!
//! 顶层 `AppError` 按类别包装各层错误，HTTP 层通过 `IntoResponse` 统一映射状态码。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::DocumentKind;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数校验失败
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// 文档解析失败
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    /// 题目生成失败
    #[error("{0}")]
    Generation(#[from] GenerationError),
    /// 导出失败
    #[error("导出失败: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他内部错误（细节只写日志，不返回给调用方）
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 请求校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("请求体格式错误: {0}")]
    MalformedBody(String),
    #[error("请求体超过 {limit} 字节上限")]
    PayloadTooLarge { limit: usize },
    #[error("内容为空")]
    MissingContent,
    #[error("文本长度 {actual} 超过 {limit} 字符上限")]
    TextTooLong { limit: usize, actual: usize },
    #[error("文件名缺失，无法判断文件类型")]
    MissingFileName,
    #[error("不支持的文件类型: {extension}")]
    UnsupportedFileType { extension: String },
    #[error("文件内容不是合法的 base64: {0}")]
    InvalidBase64(String),
    #[error("文件共 {actual} 页，超过 {limit} 页上限")]
    TooManyPages { limit: usize, actual: usize },
    #[error("题目数量 {value} 超出范围 [1, {max}]")]
    QuestionCountOutOfRange { value: usize, max: usize },
    #[error("版本数量 {value} 超出范围 [1, {max}]")]
    VersionCountOutOfRange { value: usize, max: usize },
    #[error("缺少测验数据")]
    EmptyExport,
}

/// 文档解析错误
#[derive(Debug, Error)]
#[error("解析 {kind} 文件失败: {reason}")]
pub struct ExtractionError {
    pub kind: DocumentKind,
    pub reason: String,
}

impl ExtractionError {
    pub fn new(kind: DocumentKind, reason: impl ToString) -> Self {
        Self {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// 生成阶段的整体失败（整份请求失败，不返回部分结果）
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("无法从内容中切分出有效段落（每段需超过 {min_chunk_chars} 个字符）")]
    EmptyCorpus { min_chunk_chars: usize },
    #[error("第 {version} 版内容不足: 尝试 {attempts} 次后只生成了 {committed}/{requested} 道题")]
    InsufficientContent {
        version: usize,
        attempts: usize,
        committed: usize,
        requested: usize,
    },
    #[error("生成超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    #[error("第 {version} 版生成超过截止时间: 已生成 {committed}/{requested} 道题")]
    DeadlineExceeded {
        version: usize,
        committed: usize,
        requested: usize,
    },
}

/// 单次尝试的构建失败，由选择器在本地重试吸收
#[derive(Debug, Error)]
pub enum ItemBuildFailure {
    #[error("段落 #{chunk_index} 中没有候选词")]
    NoCandidates { chunk_index: usize },
    #[error("没有包含答案 '{answer}' 的句子")]
    NoContainingSentence { answer: String },
    #[error("答案 '{answer}' 在每个候选句子中都重复出现")]
    RepeatedAnswer { answer: String },
    #[error("问题生成结果为空")]
    EmptyQuestionText,
    #[error("问题生成器失败: {0}")]
    Phraser(#[from] PhraserError),
}

/// 问题生成器（phraser）错误
#[derive(Debug, Error)]
pub enum PhraserError {
    #[error("问题生成器不可用: {0}")]
    Unavailable(String),
    #[error("问题生成器后端调用失败 (模型: {model}): {reason}")]
    Backend { model: String, reason: String },
    #[error("问题生成器返回内容为空")]
    EmptyResponse,
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF 生成失败: {0}")]
    Pdf(String),
    #[error("DOCX 生成失败: {0}")]
    Docx(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML 解析失败 ({path}): {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置项 {field} 无效: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求体格式错误
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::MalformedBody(reason.into()))
    }

    /// 创建内部错误
    pub fn internal(source: impl std::fmt::Display) -> Self {
        AppError::Internal(source.to_string())
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::PayloadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Validation(_) | AppError::Extraction(_) => StatusCode::BAD_REQUEST,
            AppError::Generation(GenerationError::EmptyCorpus { .. }) => StatusCode::BAD_REQUEST,
            AppError::Generation(GenerationError::InsufficientContent { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Generation(
                GenerationError::Timeout { .. } | GenerationError::DeadlineExceeded { .. },
            ) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Export(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() && status != StatusCode::GATEWAY_TIMEOUT {
            error!("❌ 请求处理失败: {}", self);
            "处理请求时发生内部错误".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
