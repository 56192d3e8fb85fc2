use std::sync::Arc;

use crate::application::ports::{
    HEADER_DOCUMENT_KEY, MessagePublisher, TransportError, TransportMessage,
};
use crate::domain::{DocumentKey, EnvelopeError, InboundEnvelope};

#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    #[error(transparent)]
    Rejected(#[from] EnvelopeError),
    #[error("failed to encode envelope: {0}")]
    Encoding(String),
    #[error("failed to enqueue document: {0}")]
    Publish(#[from] TransportError),
}

/// Validates submitted envelopes and puts them on the input destination.
///
/// Submission is independent of the processing switch: while processing is
/// stopped, accepted documents wait on the queue.
pub struct DocumentIngress {
    publisher: Arc<dyn MessagePublisher>,
    destination: String,
}

impl DocumentIngress {
    pub fn new(publisher: Arc<dyn MessagePublisher>, destination: impl Into<String>) -> Self {
        Self {
            publisher,
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub async fn submit(&self, envelope: &InboundEnvelope) -> Result<DocumentKey, IngressError> {
        let document = envelope.source_document()?;
        let payload =
            serde_json::to_string(envelope).map_err(|e| IngressError::Encoding(e.to_string()))?;

        let message =
            TransportMessage::new(payload).with_header(HEADER_DOCUMENT_KEY, document.key);
        self.publisher.publish(&self.destination, message).await?;

        tracing::info!(
            document_key = %document.key,
            filename = %document.filename,
            source_kind = %document.source_kind,
            destination = %self.destination,
            "Document enqueued"
        );
        Ok(document.key)
    }
}
