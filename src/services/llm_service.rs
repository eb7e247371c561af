//! LLM 服务 - 业务能力层
//!
//! 只负责"根据答案和上下文出一道题"的能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::PhraserError;
use crate::services::phraser::QuestionPhraser;

const SYSTEM_MESSAGE: &str = "You write exam questions. You receive an answer and a context passage. \
Write exactly one question, answerable from the passage, whose correct answer is the given answer. \
Never include the answer in the question. Reply with the question only.";

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成问题文本
/// - 只处理单个答案 + 单个段落
/// - 不关心选择流程和重试
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    runtime: Handle,
}

impl LlmService {
    /// 创建新的 LLM 服务
    ///
    /// `runtime` 用于在阻塞线程中驱动异步请求。
    pub fn new(config: &Config, runtime: Handle) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            runtime,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去掉首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(128u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    /// 根据答案和上下文生成问题
    pub async fn generate_question(&self, answer: &str, context: &str) -> Result<String> {
        let user_message = build_phrase_prompt(answer, context);
        self.send_to_llm(&user_message, Some(SYSTEM_MESSAGE)).await
    }
}

/// 与问题生成模型一致的输入格式
fn build_phrase_prompt(answer: &str, context: &str) -> String {
    format!("answer: {} context: {}", answer, context)
}

impl QuestionPhraser for LlmService {
    /// 必须在阻塞线程（`spawn_blocking`）中调用，不能在异步任务里直接调用
    fn phrase_question(&self, answer: &str, context: &str) -> Result<String, PhraserError> {
        let question = self
            .runtime
            .block_on(self.generate_question(answer, context))
            .map_err(|e| PhraserError::Backend {
                model: self.model_name.clone(),
                reason: e.to_string(),
            })?;

        if question.is_empty() {
            return Err(PhraserError::EmptyResponse);
        }
        Ok(question)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_prompt_shape() {
        assert_eq!(
            build_phrase_prompt("Rome", "Rome is old."),
            "answer: Rome context: Rome is old."
        );
    }

    /// 需要真实的 API Key：LLM_API_KEY=... cargo test -- --ignored
    #[test]
    #[ignore]
    fn test_phrase_question_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let config = Config::from_env().unwrap();
        let service = LlmService::new(&config, runtime.handle().clone());

        let question = service
            .phrase_question(
                "Napoleon",
                "Napoleon Bonaparte was a French military commander who rose to prominence during the French Revolution.",
            )
            .unwrap();

        println!("生成的问题: {}", question);
        assert!(!question.is_empty());
    }
}
