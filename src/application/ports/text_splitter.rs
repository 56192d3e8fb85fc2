use async_trait::async_trait;

use crate::domain::TextChunk;

#[async_trait]
pub trait TextSplitter: Send + Sync {
    /// Splits every segment independently and numbers the resulting chunks
    /// contiguously across the whole document.
    async fn split(&self, segments: &[String]) -> Result<Vec<TextChunk>, TextSplitterError>;

    /// Token target the splitter works with after clamping.
    fn target_tokens(&self) -> usize;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("tokenization failed: {0}")]
    TokenizationFailed(String),
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
    #[error("chunk limit exceeded: {produced} chunks (max {max})")]
    TooManyChunks { produced: usize, max: usize },
}
