use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;

use crate::application::ports::{
    DocumentFetcher, DurableStore, DurableStoreError, FetchError, FetchedDocument,
};
use crate::domain::{DocumentReference, SourceKind, StoragePath};

/// Reads references that point into the durable store.
pub struct StoreFetcher {
    store: Arc<dyn DurableStore>,
}

impl StoreFetcher {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Strips `scheme://authority` and percent-decoding from a store reference.
    pub fn storage_path(reference: &DocumentReference) -> StoragePath {
        let raw = reference.as_str();
        let path = match raw.find("://") {
            Some(scheme_end) => {
                let rest = &raw[scheme_end + 3..];
                rest.find('/').map(|i| &rest[i..]).unwrap_or("")
            }
            None => raw,
        };

        let decoded = urlencoding::decode(path)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| path.to_string());
        StoragePath::from_raw(decoded)
    }
}

#[async_trait]
impl DocumentFetcher for StoreFetcher {
    async fn open(
        &self,
        reference: &DocumentReference,
        kind: SourceKind,
    ) -> Result<FetchedDocument, FetchError> {
        if kind != SourceKind::Hdfs {
            return Err(FetchError::UnsupportedKind(kind.to_string()));
        }

        let path = Self::storage_path(reference);
        let data = self.store.read(&path).await.map_err(|e| match e {
            DurableStoreError::NotFound(p) => FetchError::NotFound(p),
            other => FetchError::RequestFailed(other.to_string()),
        })?;

        let content_length = Some(data.len() as u64);
        Ok(FetchedDocument {
            stream: Box::pin(stream::once(async move { Ok(data) })),
            content_length,
        })
    }
}
