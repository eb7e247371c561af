//! `POST /api/generate-quiz`

use std::time::{Duration, Instant};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::api::{json_rejection, AppState};
use crate::error::{AppError, AppResult, GenerationError};
use crate::models::{GenerateQuizRequest, GenerateQuizResponse};
use crate::services::source_loader;

pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuizRequest>, JsonRejection>,
) -> AppResult<Json<GenerateQuizResponse>> {
    let Json(request) =
        payload.map_err(|e| json_rejection(e, state.config.max_upload_bytes))?;
    info!(
        "📨 收到生成请求: 来源 {:?}, {} 题 × {} 版, 题型 {:?}",
        request.source_type, request.num_questions, request.num_versions, request.question_types
    );

    // 文档解析和题目生成都是阻塞操作，放到阻塞线程池
    let loader_state = state.clone();
    let generation = tokio::task::spawn_blocking(move || {
        source_loader::load_generation_request(
            &request,
            &loader_state.config,
            &loader_state.extractor,
        )
    })
    .await
    .map_err(AppError::internal)??;

    // 截止时间同时交给生成引擎，超时后不再继续调用问题生成器
    let secs = state.config.generation_timeout_secs;
    let deadline = Instant::now() + Duration::from_secs(secs);
    let seed = state.config.rng_seed;
    let generator = state.generator.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        generator.generate_with_deadline(&generation, Some(deadline), &mut rng)
    });

    let quizzes = tokio::time::timeout_at(deadline.into(), task)
        .await
        .map_err(|_| GenerationError::Timeout { secs })?
        .map_err(AppError::internal)??;

    info!("✅ 生成完成: {} 个版本", quizzes.len());
    Ok(Json(GenerateQuizResponse { quizzes }))
}
