//! 候选答案提取 - 业务能力层
//!
//! 启发式地把段落里所有首字母大写的单词当作候选答案（包括句首单词），
//! 只排除少量常见的大写虚词。这样不需要任何 NLP 依赖，代价是会有误报
//! （任何大写单词都可能被选中），这是有意的取舍，不是缺陷。

use std::collections::BTreeSet;
use std::sync::LazyLock;

use phf::phf_set;
use regex::Regex;

use crate::models::Chunk;

/// 一个大写字母后跟至少一个小写字母
static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\b").expect("候选词正则无效"));

/// 常见的大写虚词，不作为答案
pub static STOPLIST: phf::Set<&'static str> = phf_set! {
    "The", "A", "An", "Is", "Was", "Were",
};

/// 提取段落中的候选答案（去重，按字典序）
pub fn extract_candidates(chunk_text: &str) -> BTreeSet<String> {
    CAPITALIZED_WORD
        .find_iter(chunk_text)
        .map(|m| m.as_str())
        .filter(|word| !STOPLIST.contains(word))
        .map(str::to_string)
        .collect()
}

/// 整篇语料的候选词快照
///
/// 每个段落只提取一次，所有版本共享这份只读数据。
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    per_chunk: Vec<Vec<String>>,
    corpus_wide: Vec<String>,
}

impl CandidateIndex {
    pub fn build(chunks: &[Chunk]) -> Self {
        let per_chunk: Vec<Vec<String>> = chunks
            .iter()
            .map(|chunk| extract_candidates(&chunk.text).into_iter().collect())
            .collect();

        let corpus_wide: BTreeSet<String> = per_chunk.iter().flatten().cloned().collect();

        Self {
            per_chunk,
            corpus_wide: corpus_wide.into_iter().collect(),
        }
    }

    /// 某个段落的候选词；越界时为空
    pub fn for_chunk(&self, chunk_index: usize) -> &[String] {
        self.per_chunk
            .get(chunk_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 整篇语料的候选词（去重）
    pub fn corpus_wide(&self) -> &[String] {
        &self.corpus_wide
    }
}
