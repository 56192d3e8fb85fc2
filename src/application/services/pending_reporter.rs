use std::sync::Arc;

use crate::application::ports::{DurableStore, DurableStoreError, QueueInspector, TransportError};
use crate::domain::{PendingMode, StoragePath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReport {
    Queue { depth: usize },
    Directory { files: Vec<String> },
}

impl PendingReport {
    pub fn count(&self) -> usize {
        match self {
            PendingReport::Queue { depth } => *depth,
            PendingReport::Directory { files } => files.len(),
        }
    }

    pub fn mode(&self) -> PendingMode {
        match self {
            PendingReport::Queue { .. } => PendingMode::Queue,
            PendingReport::Directory { .. } => PendingMode::Directory,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PendingError {
    #[error("queue inspection failed: {0}")]
    Queue(#[from] TransportError),
    #[error("directory listing failed: {0}")]
    Directory(#[from] DurableStoreError),
}

/// Counts work not yet picked up, either on the input destination or in the
/// durable store's input directory.
pub struct PendingReporter {
    mode: PendingMode,
    inspector: Arc<dyn QueueInspector>,
    input_destination: String,
    durable_store: Arc<dyn DurableStore>,
    input_dir: StoragePath,
}

impl PendingReporter {
    pub fn new(
        mode: PendingMode,
        inspector: Arc<dyn QueueInspector>,
        input_destination: impl Into<String>,
        durable_store: Arc<dyn DurableStore>,
        input_dir: StoragePath,
    ) -> Self {
        Self {
            mode,
            inspector,
            input_destination: input_destination.into(),
            durable_store,
            input_dir,
        }
    }

    pub async fn report(&self) -> Result<PendingReport, PendingError> {
        match self.mode {
            PendingMode::Queue => {
                let depth = self.inspector.depth(&self.input_destination).await?;
                Ok(PendingReport::Queue { depth })
            }
            PendingMode::Directory => match self.durable_store.list(&self.input_dir).await {
                Ok(files) => Ok(PendingReport::Directory { files }),
                Err(DurableStoreError::NotFound(_)) => {
                    Ok(PendingReport::Directory { files: Vec::new() })
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}
