use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{DurableStore, DurableStoreError};
use crate::domain::StoragePath;

pub const DIRECTORY_MARKER: &str = ".keep";

/// [`DurableStore`] over any `object_store` backend.
///
/// Object stores have no real directories: `mkdir` writes a marker object and
/// a recursive delete removes everything under the prefix.
pub struct ObjectDurableStore {
    inner: Arc<dyn ObjectStore>,
    base_url: String,
}

impl ObjectDurableStore {
    pub fn new(inner: Arc<dyn ObjectStore>, base_url: impl Into<String>) -> Self {
        Self {
            inner,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn local(root: PathBuf, base_url: impl Into<String>) -> Result<Self, DurableStoreError> {
        std::fs::create_dir_all(&root)
            .map_err(|e| DurableStoreError::Unavailable(format!("{}: {e}", root.display())))?;
        let fs = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| DurableStoreError::Unavailable(e.to_string()))?
            .with_automatic_cleanup(true);
        Ok(Self::new(Arc::new(fs), base_url))
    }

    pub fn in_memory(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn children(&self, dir: &StorePath) -> Result<Vec<StorePath>, DurableStoreError> {
        self.inner
            .list(Some(dir))
            .map_ok(|meta| meta.location)
            .try_collect()
            .await
            .map_err(|e| DurableStoreError::ReadFailed(e.to_string()))
    }
}

#[async_trait]
impl DurableStore for ObjectDurableStore {
    async fn exists(&self, path: &StoragePath) -> Result<bool, DurableStoreError> {
        let store_path = StorePath::from(path.as_str());
        match self.inner.head(&store_path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => {
                Ok(!self.children(&store_path).await?.is_empty())
            }
            Err(e) => Err(DurableStoreError::ReadFailed(e.to_string())),
        }
    }

    async fn write(&self, path: &StoragePath, data: Bytes) -> Result<(), DurableStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map(|_| ())
            .map_err(|e| DurableStoreError::WriteFailed(format!("{path}: {e}")))
    }

    async fn delete(&self, path: &StoragePath, recursive: bool) -> Result<(), DurableStoreError> {
        let store_path = StorePath::from(path.as_str());
        let children = self.children(&store_path).await?;

        if !children.is_empty() && !recursive {
            return Err(DurableStoreError::DeleteFailed(format!(
                "{path} is a non-empty directory"
            )));
        }

        for child in &children {
            match self.inner.delete(child).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(DurableStoreError::DeleteFailed(format!("{child}: {e}"))),
            }
        }

        match self.inner.delete(&store_path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) if !children.is_empty() => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                Err(DurableStoreError::NotFound(path.to_string()))
            }
            Err(e) => Err(DurableStoreError::DeleteFailed(format!("{path}: {e}"))),
        }
    }

    async fn mkdir(&self, path: &StoragePath) -> Result<(), DurableStoreError> {
        let marker = StorePath::from(path.join(DIRECTORY_MARKER).as_str());
        self.inner
            .put(&marker, PutPayload::from(Bytes::new()))
            .await
            .map(|_| ())
            .map_err(|e| DurableStoreError::MkdirFailed(format!("{path}: {e}")))
    }

    async fn read(&self, path: &StoragePath) -> Result<Bytes, DurableStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = match self.inner.get(&store_path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(DurableStoreError::NotFound(path.to_string()));
            }
            Err(e) => return Err(DurableStoreError::ReadFailed(e.to_string())),
        };

        result
            .bytes()
            .await
            .map_err(|e| DurableStoreError::ReadFailed(e.to_string()))
    }

    async fn list(&self, dir: &StoragePath) -> Result<Vec<String>, DurableStoreError> {
        let store_path = StorePath::from(dir.as_str());
        let listing = self
            .inner
            .list_with_delimiter(Some(&store_path))
            .await
            .map_err(|e| DurableStoreError::ReadFailed(e.to_string()))?;

        let mut names: Vec<String> = listing
            .objects
            .into_iter()
            .filter_map(|meta| meta.location.filename().map(str::to_string))
            .filter(|name| name != DIRECTORY_MARKER)
            .collect();
        names.sort();
        Ok(names)
    }

    fn locate(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
