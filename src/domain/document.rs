use super::{DocumentKey, DocumentReference, SourceKind};

/// A document taken off the queue and accepted for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub key: DocumentKey,
    pub reference: DocumentReference,
    pub source_kind: SourceKind,
    pub filename: String,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Text,
    Unknown,
}

impl ContentType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            m if m.starts_with("text/") => Some(Self::Text),
            "application/json" | "application/xml" => Some(Self::Text),
            "application/octet-stream" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Self {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" | "md" | "markdown" | "csv" | "tsv" | "json" | "xml" | "html"
            | "htm" | "log" | "yaml" | "yml" => Self::Text,
            _ => Self::Unknown,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl SourceDocument {
    pub fn new(reference: DocumentReference, source_kind: SourceKind) -> Self {
        let filename = reference.filename();
        Self {
            key: DocumentKey::from_reference(&reference),
            content_type: ContentType::from_filename(&filename),
            reference,
            source_kind,
            filename,
        }
    }
}
