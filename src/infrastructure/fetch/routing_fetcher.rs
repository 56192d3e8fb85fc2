use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{DocumentFetcher, FetchError, FetchedDocument};
use crate::domain::{DocumentReference, SourceKind};

/// Dispatches to the fetcher registered for the reference's source kind.
pub struct RoutingFetcher {
    fetchers: HashMap<SourceKind, Arc<dyn DocumentFetcher>>,
}

impl RoutingFetcher {
    pub fn new(fetchers: Vec<(SourceKind, Arc<dyn DocumentFetcher>)>) -> Self {
        Self {
            fetchers: fetchers.into_iter().collect(),
        }
    }

    pub fn supports(&self, kind: SourceKind) -> bool {
        self.fetchers.contains_key(&kind)
    }
}

#[async_trait]
impl DocumentFetcher for RoutingFetcher {
    async fn open(
        &self,
        reference: &DocumentReference,
        kind: SourceKind,
    ) -> Result<FetchedDocument, FetchError> {
        let fetcher = self
            .fetchers
            .get(&kind)
            .ok_or_else(|| FetchError::UnsupportedKind(kind.to_string()))?;
        fetcher.open(reference, kind).await
    }
}
