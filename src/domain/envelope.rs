use serde::{Deserialize, Serialize};

use super::{DocumentReference, SourceDocument, SourceKind};

/// Message taken from the input destination.
///
/// `type` is kept as a raw string so an unsupported kind can be reported
/// instead of failing deserialisation outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEnvelope {
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub input_stream: Option<String>,
    #[serde(default)]
    pub output_stream: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("unsupported source type: {0:?}")]
    UnsupportedSourceType(String),
    #[error("envelope carries no document reference")]
    MissingReference,
}

/// Message published for downstream consumers after a document completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope {
    #[serde(rename = "type")]
    pub source_type: SourceKind,
    pub url: String,
    pub processed: bool,
    pub original_file: DocumentReference,
}

impl InboundEnvelope {
    pub fn new(source_type: SourceKind, url: impl Into<String>) -> Self {
        Self {
            source_type: source_type.as_str().to_string(),
            url: Some(url.into()),
            input_stream: None,
            output_stream: None,
        }
    }

    /// Resolves the source kind and a non-blank reference.
    pub fn source_document(&self) -> Result<SourceDocument, EnvelopeError> {
        let kind: SourceKind = self
            .source_type
            .parse()
            .map_err(|_| EnvelopeError::UnsupportedSourceType(self.source_type.clone()))?;

        let reference = self
            .url
            .as_deref()
            .map(DocumentReference::new)
            .filter(|r| !r.is_blank())
            .ok_or(EnvelopeError::MissingReference)?;

        Ok(SourceDocument::new(reference, kind))
    }
}

impl OutboundEnvelope {
    pub fn processed(source_type: SourceKind, url: String, original_file: DocumentReference) -> Self {
        Self {
            source_type,
            url,
            processed: true,
            original_file,
        }
    }
}
