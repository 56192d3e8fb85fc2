use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Local-disk staging area for documents between download and extraction.
///
/// Uploads are multipart so a document is never buffered whole; an upload
/// that fails or crosses the size cap is aborted and leaves nothing behind.
pub struct LocalStagingStore {
    fs: LocalFileSystem,
    root: PathBuf,
}

impl LocalStagingStore {
    pub fn new(root: PathBuf) -> Result<Self, StagingStoreError> {
        std::fs::create_dir_all(&root)?;
        let fs = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?
            .with_automatic_cleanup(true);
        Ok(Self { fs, root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

fn object_path(path: &StoragePath) -> ObjectPath {
    ObjectPath::from(path.as_str())
}

fn read_error(path: &StoragePath, error: object_store::Error) -> StagingStoreError {
    match error {
        object_store::Error::NotFound { .. } => StagingStoreError::NotFound(path.to_string()),
        other => StagingStoreError::DownloadFailed(other.to_string()),
    }
}

async fn abort_with(
    mut upload: Box<dyn MultipartUpload>,
    error: StagingStoreError,
) -> Result<u64, StagingStoreError> {
    if let Err(e) = upload.abort().await {
        tracing::warn!(error = %e, "Failed to abort staging upload");
    }
    Err(error)
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        max_bytes: Option<u64>,
    ) -> Result<u64, StagingStoreError> {
        let mut upload = self
            .fs
            .put_multipart(&object_path(path))
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        let mut written: u64 = 0;
        while let Some(next) = stream.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(e) => return abort_with(upload, StagingStoreError::Io(e)).await,
            };

            written += bytes.len() as u64;
            if let Some(limit) = max_bytes.filter(|limit| written > *limit) {
                tracing::warn!(path = %path, limit, "Document exceeds size limit");
                return abort_with(upload, StagingStoreError::TooLarge { limit }).await;
            }

            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                return abort_with(upload, StagingStoreError::UploadFailed(e.to_string())).await;
            }
        }

        if let Err(e) = upload.complete().await {
            return Err(StagingStoreError::UploadFailed(e.to_string()));
        }

        tracing::debug!(path = %path, bytes = written, "Document staged");
        Ok(written)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Vec<u8>, StagingStoreError> {
        let object = self
            .fs
            .get(&object_path(path))
            .await
            .map_err(|e| read_error(path, e))?;
        let bytes = object.bytes().await.map_err(|e| read_error(path, e))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        self.fs
            .delete(&object_path(path))
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => StagingStoreError::NotFound(path.to_string()),
                other => StagingStoreError::DeleteFailed(other.to_string()),
            })
    }

    async fn head(&self, path: &StoragePath) -> Result<u64, StagingStoreError> {
        let meta = self
            .fs
            .head(&object_path(path))
            .await
            .map_err(|e| read_error(path, e))?;
        Ok(meta.size as u64)
    }
}
