use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;

use crate::application::ports::{DocumentFetcher, FetchError, FetchedDocument};
use crate::domain::{DocumentReference, SourceKind};

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::RequestFailed(error.to_string())
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn open(
        &self,
        reference: &DocumentReference,
        kind: SourceKind,
    ) -> Result<FetchedDocument, FetchError> {
        if kind != SourceKind::Http {
            return Err(FetchError::UnsupportedKind(kind.to_string()));
        }

        let url = reference.encoded_for_network();
        tracing::debug!(url = %url, "Downloading document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }

        let response = response.error_for_status().map_err(|e| self.map_error(e))?;
        let content_length = response.content_length();
        let timeout_secs = self.timeout.as_secs();

        let stream = response.bytes_stream().map_err(move |e| {
            if e.is_timeout() {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("download timed out after {timeout_secs}s"),
                )
            } else {
                io::Error::other(e)
            }
        });

        Ok(FetchedDocument {
            stream: Box::pin(stream),
            content_length,
        })
    }
}
