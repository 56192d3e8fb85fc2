use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{SourceKind, StoragePath};

/// Persistent store that receives the extracted output.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn exists(&self, path: &StoragePath) -> Result<bool, DurableStoreError>;

    async fn write(&self, path: &StoragePath, data: Bytes) -> Result<(), DurableStoreError>;

    async fn delete(&self, path: &StoragePath, recursive: bool) -> Result<(), DurableStoreError>;

    async fn mkdir(&self, path: &StoragePath) -> Result<(), DurableStoreError>;

    async fn read(&self, path: &StoragePath) -> Result<Bytes, DurableStoreError>;

    /// File names directly under `dir`, excluding directory markers.
    async fn list(&self, dir: &StoragePath) -> Result<Vec<String>, DurableStoreError>;

    /// Reference downstream consumers use to reach `path`.
    fn locate(&self, path: &StoragePath) -> String;

    fn source_kind(&self) -> SourceKind {
        SourceKind::Hdfs
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DurableStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("mkdir failed: {0}")]
    MkdirFailed(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
