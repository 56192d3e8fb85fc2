use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::TextExtractor;
use crate::domain::ContentType;
use crate::presentation::config::ProcessingSettings;

use super::{CompositeExtractor, PdfAdapter, PlainTextAdapter};

pub struct ExtractorFactory;

impl ExtractorFactory {
    /// PDF and text adapters, with plain text as the fallback for unknown
    /// extensions.
    pub fn create(settings: &ProcessingSettings) -> Arc<dyn TextExtractor> {
        let timeout = Duration::from_secs(settings.extraction_timeout_secs.max(1));
        let text: Arc<dyn TextExtractor> = Arc::new(PlainTextAdapter);
        let pdf: Arc<dyn TextExtractor> = Arc::new(PdfAdapter::with_timeout(timeout));

        tracing::info!(
            extraction_timeout_secs = timeout.as_secs(),
            "Extraction backend configured (pdf, text)"
        );

        Arc::new(
            CompositeExtractor::new(vec![
                (ContentType::Pdf, pdf),
                (ContentType::Text, Arc::clone(&text)),
            ])
            .with_fallback(text),
        )
    }
}
