use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{DocumentReference, SourceKind};

/// Opens a byte stream for a document reference of a given source kind.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn open(
        &self,
        reference: &DocumentReference,
        kind: SourceKind,
    ) -> Result<FetchedDocument, FetchError>;
}

pub struct FetchedDocument {
    pub stream: BoxStream<'static, Result<Bytes, io::Error>>,
    pub content_length: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unsupported source kind: {0}")]
    UnsupportedKind(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("download timed out after {0}s")]
    Timeout(u64),
}
