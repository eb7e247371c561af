//! HTTP 接口层
//!
//! | 方法 | 路径 | 说明 |
//! |------|------|------|
//! | POST | `/api/generate-quiz` | 从文本或文件生成多个版本的测验 |
//! | POST | `/api/export-quiz` | 导出一份测验为 PDF / DOCX / TXT |
//! | GET  | `/health` | 健康检查 |

mod export;
mod health;
mod quiz;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{AppError, ValidationError};
use crate::orchestrator::QuizGenerator;
use crate::services::DocumentExtractor;

/// 所有请求共享的状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<QuizGenerator>,
    pub extractor: Arc<DocumentExtractor>,
}

impl AppState {
    pub fn new(config: Config, generator: QuizGenerator) -> Self {
        let extractor = DocumentExtractor::new(config.max_pdf_pages);
        Self {
            config: Arc::new(config),
            generator: Arc::new(generator),
            extractor: Arc::new(extractor),
        }
    }
}

/// 构建路由
///
/// 请求体上限取 `config.max_upload_bytes`，替换 axum 默认的 2 MB
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/api/generate-quiz", post(quiz::generate_quiz))
        .route("/api/export-quiz", post(export::export_quiz))
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON 解析失败转换为业务错误；超过请求体上限返回 413
fn json_rejection(rejection: JsonRejection, limit: usize) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::PayloadTooLarge { limit }.into()
    } else {
        AppError::malformed_body(rejection.body_text())
    }
}
