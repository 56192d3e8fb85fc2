use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use crate::application::ports::{DocumentFetcher, FetchError, FetchedDocument};
use crate::domain::{DocumentReference, SourceKind};

/// Reads references naming a local path or a `file://` URL.
pub struct FileFetcher;

impl FileFetcher {
    fn resolve(reference: &DocumentReference) -> PathBuf {
        let raw = reference.as_str();
        match raw.strip_prefix("file://") {
            Some(rest) => {
                let path = rest.strip_prefix("localhost").unwrap_or(rest);
                let decoded = urlencoding::decode(path)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| path.to_string());
                PathBuf::from(decoded)
            }
            None => PathBuf::from(raw),
        }
    }
}

#[async_trait]
impl DocumentFetcher for FileFetcher {
    async fn open(
        &self,
        reference: &DocumentReference,
        kind: SourceKind,
    ) -> Result<FetchedDocument, FetchError> {
        if kind != SourceKind::File {
            return Err(FetchError::UnsupportedKind(kind.to_string()));
        }

        let path = Self::resolve(reference);
        let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::RequestFailed(format!("{}: {e}", path.display())),
        })?;

        let content_length = Some(data.len() as u64);
        Ok(FetchedDocument {
            stream: Box::pin(stream::once(async move { Ok(Bytes::from(data)) })),
            content_length,
        })
    }
}
