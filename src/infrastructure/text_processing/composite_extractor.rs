use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{ExtractionError, TextExtractor};
use crate::domain::{ContentType, SourceDocument};

/// Routes each document to the extractor registered for its content type.
pub struct CompositeExtractor {
    adapters: HashMap<ContentType, Arc<dyn TextExtractor>>,
    fallback: Option<Arc<dyn TextExtractor>>,
}

impl CompositeExtractor {
    pub fn new(adapters: Vec<(ContentType, Arc<dyn TextExtractor>)>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
            fallback: None,
        }
    }

    /// Extractor used for content types without a registered adapter.
    pub fn with_fallback(mut self, fallback: Arc<dyn TextExtractor>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl TextExtractor for CompositeExtractor {
    async fn extract_segments(
        &self,
        data: &[u8],
        document: &SourceDocument,
    ) -> Result<Vec<String>, ExtractionError> {
        let adapter = self
            .adapters
            .get(&document.content_type)
            .or(self.fallback.as_ref())
            .ok_or_else(|| {
                ExtractionError::UnsupportedContentType(
                    document.content_type.as_mime().to_string(),
                )
            })?;

        adapter.extract_segments(data, document).await
    }
}
