use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;

use crate::application::ports::{ExtractionError, TextExtractor};
use crate::domain::{ContentType, SourceDocument};

use super::text_sanitizer::sanitize_extracted_text;

const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-page PDF text extraction; each non-blank page becomes one segment.
pub struct PdfAdapter {
    timeout: Duration,
}

impl Default for PdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAdapter {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn extract_pages(path: &std::path::Path) -> Result<Vec<String>, ExtractionError> {
        let mut doc = PdfDocument::open(path)
            .map_err(|e| ExtractionError::ParseFailed(format!("failed to parse PDF: {e}")))?;

        let page_count = doc.page_count().map_err(|e| {
            ExtractionError::ParseFailed(format!("failed to read page count: {e}"))
        })?;

        let mut pages = Vec::with_capacity(page_count);

        for page_index in 0..page_count {
            match doc.extract_text(page_index) {
                Ok(text) if !text.trim().is_empty() => pages.push(text),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(page = page_index + 1, error = %e, "Skipping unreadable PDF page");
                }
            }
        }

        Ok(pages)
    }
}

#[async_trait]
impl TextExtractor for PdfAdapter {
    #[tracing::instrument(
        skip(self, data),
        fields(
            document_key = %document.key,
            filename = %document.filename,
        )
    )]
    async fn extract_segments(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<Vec<String>, ExtractionError> {
        if document.content_type != ContentType::Pdf {
            return Err(ExtractionError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let mut temp_file = tempfile::NamedTempFile::new().map_err(|e| {
            ExtractionError::ExtractionFailed(format!("failed to create temp file: {e}"))
        })?;

        temp_file.write_all(data).map_err(|e| {
            ExtractionError::ExtractionFailed(format!("failed to write temp file: {e}"))
        })?;

        let temp_path = temp_file.path().to_path_buf();

        let pages = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || Self::extract_pages(&temp_path)),
        )
        .await
        .map_err(|_| ExtractionError::Timeout(self.timeout.as_secs()))?
        .map_err(|e| ExtractionError::ExtractionFailed(format!("task join error: {e}")))??;

        tracing::info!(page_count = pages.len(), "PDF text extraction complete");

        let sanitized_pages: Vec<String> = pages
            .into_iter()
            .map(|p| sanitize_extracted_text(&p))
            .filter(|t| !t.is_empty())
            .collect();

        if sanitized_pages.is_empty() {
            return Err(ExtractionError::NoTextFound(document.filename.clone()));
        }

        Ok(sanitized_pages)
    }
}
