/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// 过滤级别取自 `RUST_LOG`，未设置时为 `info`（`verbose` 时为 `debug`）。
/// 重复调用是安全的，后续调用会被忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, phraser_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 测验生成服务启动");
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}", config.bind_addr());
    info!("🤖 问题生成器: {}", phraser_name);
    info!(
        "📏 限制: 文本 {} 字符 / PDF {} 页 / 每版 {} 题 / {} 个版本",
        config.max_text_chars, config.max_pdf_pages, config.max_questions, config.max_versions
    );
    info!("{}", "=".repeat(60));
}

/// 记录生成开始信息
pub fn log_generation_start(chunk_count: usize, num_questions: usize, num_versions: usize) {
    info!(
        "📚 共切分出 {} 个段落，准备生成 {} 个版本 × {} 道题",
        chunk_count, num_versions, num_questions
    );
}

/// 记录单个版本完成信息
///
/// # 参数
/// - `version`: 版本号
/// - `committed`: 生成题目数
/// - `attempts`: 总尝试次数
/// - `rejected`: 被丢弃的尝试次数
pub fn log_version_complete(version: usize, committed: usize, attempts: usize, rejected: usize) {
    info!(
        "[版本 {}] ✓ 完成: {} 道题 (尝试 {} 次, 丢弃 {} 次)",
        version, committed, attempts, rejected
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
