/// 一个段落级的上下文窗口
///
/// 由切分器一次性产生，之后不再修改；`index` 是它在切分结果中的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// 字符数（不是字节数）
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
