use async_trait::async_trait;

use crate::domain::SourceDocument;

/// Extraction backend: bytes in, page-like text segments out.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_segments(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<Vec<String>, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("parse failed: {0}")]
    ParseFailed(String),
    #[error("no text found in: {0}")]
    NoTextFound(String),
    #[error("extraction timed out after {0}s")]
    Timeout(u64),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
}
