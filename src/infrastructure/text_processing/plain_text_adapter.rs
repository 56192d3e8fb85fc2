use async_trait::async_trait;

use crate::application::ports::{ExtractionError, TextExtractor};
use crate::domain::SourceDocument;

use super::text_sanitizer::sanitize_extracted_text;

const PAGE_BREAK: char = '\u{000C}';

/// UTF-8 text; form feeds split the text into page segments.
pub struct PlainTextAdapter;

#[async_trait]
impl TextExtractor for PlainTextAdapter {
    async fn extract_segments(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<Vec<String>, ExtractionError> {
        let text = std::str::from_utf8(data).map_err(|e| {
            ExtractionError::ParseFailed(format!("{} is not valid UTF-8: {e}", document.filename))
        })?;

        let segments: Vec<String> = text
            .split(PAGE_BREAK)
            .map(sanitize_extracted_text)
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(ExtractionError::NoTextFound(document.filename.clone()));
        }

        Ok(segments)
    }
}
