use std::sync::Arc;

use docstream::application::ports::HEADER_DOCUMENT_KEY;
use docstream::application::services::{DocumentIngress, IngressError};
use docstream::domain::{
    DocumentKey, DocumentReference, EnvelopeError, InboundEnvelope, SourceKind,
};
use docstream::infrastructure::messaging::InMemoryBroker;

use crate::helpers::INPUT_DESTINATION;

const REPORT_URL: &str = "http://files.example/report.pdf";

fn ingress() -> (Arc<InMemoryBroker>, DocumentIngress) {
    let broker = Arc::new(InMemoryBroker::new());
    let ingress = DocumentIngress::new(broker.clone(), INPUT_DESTINATION);
    (broker, ingress)
}

#[tokio::test]
async fn given_valid_envelope_when_submitted_then_queued_with_document_key() {
    let (broker, ingress) = ingress();
    let envelope = InboundEnvelope::new(SourceKind::Http, REPORT_URL);

    let key = ingress.submit(&envelope).await.unwrap();

    assert_eq!(key, DocumentKey::from_reference(&DocumentReference::new(REPORT_URL)));
    let queued = broker.drain(INPUT_DESTINATION);
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].header(HEADER_DOCUMENT_KEY), Some(key.to_hex().as_str()));
    let delivered: InboundEnvelope = serde_json::from_str(&queued[0].payload).unwrap();
    assert_eq!(delivered, envelope);
}

#[tokio::test]
async fn given_unknown_type_when_submitted_then_rejected() {
    let (broker, ingress) = ingress();
    let envelope: InboundEnvelope =
        serde_json::from_str(r#"{"type":"S3","url":"s3://bucket/a.pdf"}"#).unwrap();

    let result = ingress.submit(&envelope).await;

    assert!(matches!(
        result,
        Err(IngressError::Rejected(EnvelopeError::UnsupportedSourceType(kind))) if kind == "S3"
    ));
    assert_eq!(broker.queued(INPUT_DESTINATION), 0);
}

#[tokio::test]
async fn given_missing_url_when_submitted_then_rejected() {
    let (_broker, ingress) = ingress();
    let envelope: InboundEnvelope = serde_json::from_str(r#"{"type":"FILE"}"#).unwrap();

    let result = ingress.submit(&envelope).await;

    assert!(matches!(
        result,
        Err(IngressError::Rejected(EnvelopeError::MissingReference))
    ));
}
