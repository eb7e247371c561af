use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// 问题生成器后端
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraserBackend {
    /// 兼容 OpenAI API 的大模型
    Llm,
    /// 离线模板，不依赖网络
    Template,
}

impl FromStr for PhraserBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "llm" => Ok(PhraserBackend::Llm),
            "template" => Ok(PhraserBackend::Template),
            other => Err(format!("未知的问题生成器后端: {}", other)),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub server_host: String,
    /// 监听端口
    pub server_port: u16,
    /// 粘贴文本的字符上限
    pub max_text_chars: usize,
    /// PDF 页数上限
    pub max_pdf_pages: usize,
    /// HTTP 请求体上限（字节，base64 编码后的文件也计算在内）
    pub max_upload_bytes: usize,
    /// 单个版本的题目数量上限
    pub max_questions: usize,
    /// 版本数量上限
    pub max_versions: usize,
    /// 段落最短长度（字符数，严格大于）
    pub min_chunk_chars: usize,
    /// 每道题允许的尝试次数，乘以题目数即为单个版本的尝试预算
    pub attempts_per_question: usize,
    /// 填空题的空白标记
    pub blank_marker: String,
    /// 单次生成请求的超时（秒）
    pub generation_timeout_secs: u64,
    /// 固定随机种子（用于复现）
    pub rng_seed: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 问题生成器配置 ---
    pub phraser_backend: PhraserBackend,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            max_text_chars: 100_000,
            max_pdf_pages: 200,
            max_upload_bytes: 50 * 1024 * 1024,
            max_questions: 100,
            max_versions: 10,
            min_chunk_chars: 150,
            attempts_per_question: 20,
            blank_marker: "___".to_string(),
            generation_timeout_secs: 120,
            rng_seed: None,
            verbose_logging: false,
            phraser_backend: PhraserBackend::Llm,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → `QUIZGEN_CONFIG` 指定的 TOML 文件 → 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("QUIZGEN_CONFIG") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()?.validate()
    }

    /// 只从环境变量读取（其余使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()?.validate()
    }

    /// 拒绝会让每个请求都必然失败的取值
    pub fn validate(self) -> Result<Self, ConfigError> {
        let positive = [
            ("attempts_per_question", self.attempts_per_question),
            ("max_questions", self.max_questions),
            ("max_versions", self.max_versions),
            ("max_upload_bytes", self.max_upload_bytes),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.generation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation_timeout_secs".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(self)
    }

    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            server_host: env_string("SERVER_HOST").unwrap_or(self.server_host),
            server_port: env_parse("SERVER_PORT", "u16")?.unwrap_or(self.server_port),
            max_text_chars: env_parse("MAX_TEXT_CHARS", "usize")?.unwrap_or(self.max_text_chars),
            max_pdf_pages: env_parse("MAX_PDF_PAGES", "usize")?.unwrap_or(self.max_pdf_pages),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", "usize")?
                .unwrap_or(self.max_upload_bytes),
            max_questions: env_parse("MAX_QUESTIONS", "usize")?.unwrap_or(self.max_questions),
            max_versions: env_parse("MAX_VERSIONS", "usize")?.unwrap_or(self.max_versions),
            min_chunk_chars: env_parse("MIN_CHUNK_CHARS", "usize")?.unwrap_or(self.min_chunk_chars),
            attempts_per_question: env_parse("ATTEMPTS_PER_QUESTION", "usize")?
                .unwrap_or(self.attempts_per_question),
            blank_marker: env_string("BLANK_MARKER").unwrap_or(self.blank_marker),
            generation_timeout_secs: env_parse("GENERATION_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.generation_timeout_secs),
            rng_seed: env_parse("RNG_SEED", "u64")?.or(self.rng_seed),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            phraser_backend: env_parse("PHRASER_BACKEND", "llm | template")?
                .unwrap_or(self.phraser_backend),
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
        })
    }

    /// 监听地址 `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok()
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
