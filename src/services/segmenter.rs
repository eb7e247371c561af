//! 文本切分服务 - 业务能力层
//!
//! 把整篇文本切成段落级的上下文窗口，以及把段落切成句子。

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::Chunk;

/// 段落分隔符（空行）
const PARAGRAPH_BREAK: &str = "\n\n";

/// 句末标点后跟空白
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("句子边界正则无效"));

/// 按空行切分文本
///
/// 每段去掉首尾空白，只保留字符数严格大于 `min_chars` 的段落，顺序与原文一致。
/// 返回空列表时由调用方视为 `EmptyCorpus`。
pub fn segment(source_text: &str, min_chars: usize) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = source_text
        .split(PARAGRAPH_BREAK)
        .map(str::trim)
        .filter(|paragraph| paragraph.chars().count() > min_chars)
        .enumerate()
        .map(|(index, paragraph)| Chunk::new(index, paragraph))
        .collect();

    debug!(
        "切分完成: {} 个有效段落 (最短 {} 字符)",
        chunks.len(),
        min_chars
    );
    chunks
}

/// 按句末标点（`.` `!` `?` 后跟空白）切分句子
///
/// 标点保留在句子里，分隔用的空白被丢弃。
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_END.find_iter(text) {
        // 标点都是 ASCII，占一个字节
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}
