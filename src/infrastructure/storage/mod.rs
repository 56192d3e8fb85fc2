mod local_store;
mod object_durable_store;
mod store_factory;

pub use local_store::LocalStagingStore;
pub use object_durable_store::{DIRECTORY_MARKER, ObjectDurableStore};
pub use store_factory::StoreFactory;
