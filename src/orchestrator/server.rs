//! 服务入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：根据配置选择问题生成器，创建共享的 `QuizGenerator`
//! 2. **资源管理**：问题生成器只创建一次，以 `Arc` 在所有请求之间共享
//! 3. **运行**：绑定地址并启动 HTTP 服务

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::{Config, PhraserBackend};
use crate::orchestrator::QuizGenerator;
use crate::services::{ItemBuilder, LlmService, QuestionPhraser, TemplatePhraser};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    state: AppState,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let phraser = build_phraser(&config);
        logging::log_startup(&config, phraser.name());

        let builder = ItemBuilder::new(phraser, config.blank_marker.clone());
        let generator = QuizGenerator::new(
            builder,
            config.min_chunk_chars,
            config.attempts_per_question,
        );

        Ok(Self {
            state: AppState::new(config, generator),
        })
    }

    /// 共享状态（测试中直接构建路由用）
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// 运行 HTTP 服务，直到进程退出
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("无法绑定地址 {}", addr))?;
        info!("✓ 服务已启动: http://{}", addr);

        axum::serve(listener, api::router(self.state))
            .await
            .context("HTTP 服务异常退出")?;
        Ok(())
    }
}

/// 选择问题生成器
///
/// 未配置 API Key 时退回离线模板，保证服务可以启动。
fn build_phraser(config: &Config) -> Arc<dyn QuestionPhraser> {
    match config.phraser_backend {
        PhraserBackend::Llm if !config.llm_api_key.is_empty() => {
            Arc::new(LlmService::new(config, Handle::current()))
        }
        PhraserBackend::Llm => {
            warn!("⚠️ 未设置 LLM_API_KEY，改用离线模板生成问题");
            Arc::new(TemplatePhraser::new(config.blank_marker.clone()))
        }
        PhraserBackend::Template => Arc::new(TemplatePhraser::new(config.blank_marker.clone())),
    }
}
