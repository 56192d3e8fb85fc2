use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{
    DurableStore, DurableStoreError, StagingStore, StagingStoreError,
};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::local_store::LocalStagingStore;
use super::object_durable_store::ObjectDurableStore;

pub struct StoreFactory;

impl StoreFactory {
    pub fn create_durable(
        settings: &StorageSettings,
    ) -> Result<Arc<dyn DurableStore>, DurableStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let root = PathBuf::from(&settings.durable_root);
                let store = ObjectDurableStore::local(root, settings.base_url.clone())?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Memory => {
                Ok(Arc::new(ObjectDurableStore::in_memory(settings.base_url.clone())))
            }
        }
    }

    pub fn create_staging(
        settings: &StorageSettings,
    ) -> Result<Arc<dyn StagingStore>, StagingStoreError> {
        let store = LocalStagingStore::new(PathBuf::from(&settings.staging_path))?;
        Ok(Arc::new(store))
    }
}
