//! `POST /api/export-quiz`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::{json_rejection, AppState};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::ExportRequest;
use crate::services::exporter;

pub async fn export_quiz(
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) =
        payload.map_err(|e| json_rejection(e, state.config.max_upload_bytes))?;
    if request.quiz_data.is_empty() {
        return Err(ValidationError::EmptyExport.into());
    }

    let format = request.format;
    let bytes = tokio::task::spawn_blocking(move || exporter::export(&request.quiz_data, format))
        .await
        .map_err(AppError::internal)??;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
