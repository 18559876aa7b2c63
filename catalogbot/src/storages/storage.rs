use std::sync::Arc;

use botkit::storage::{CallbackDataStorage, CallbackDataStorageTrait};

use crate::storages::{
    CatalogStorageTrait, MemoryCatalogStorage, SessionStorage, SessionStorageTrait,
};

/// Combined storage trait that provides all storage operations
/// This trait allows converting to specific trait objects for functions that only need subset of functionality
pub trait StorageTrait: Send + Sync {
    /// Convert to CatalogStorageTrait trait object
    fn as_catalog_storage(self: Arc<Self>) -> Arc<dyn CatalogStorageTrait>;

    /// Convert to SessionStorageTrait trait object
    fn as_session_storage(self: Arc<Self>) -> Arc<dyn SessionStorageTrait>;

    /// Convert to CallbackDataStorageTrait trait object
    fn as_callback_data_storage(self: Arc<Self>) -> Arc<dyn CallbackDataStorageTrait>;
}

/// Everything the bot keeps: the catalog and per-chat state
#[derive(Clone)]
pub struct Storage {
    catalog: Arc<dyn CatalogStorageTrait>,
    sessions: Arc<dyn SessionStorageTrait>,
    callback_data: Arc<dyn CallbackDataStorageTrait>,
}

impl Storage {
    /// Create a storage with an empty in-memory catalog
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(MemoryCatalogStorage::new()),
            sessions: Arc::new(SessionStorage::new()),
            callback_data: Arc::new(CallbackDataStorage::new()),
        }
    }

    /// Builder-like method to configure catalog storage
    pub fn catalog_storage(mut self, storage: impl CatalogStorageTrait + 'static) -> Self {
        self.catalog = Arc::new(storage);
        self
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageTrait for Storage {
    fn as_catalog_storage(self: Arc<Self>) -> Arc<dyn CatalogStorageTrait> {
        self.catalog.clone()
    }

    fn as_session_storage(self: Arc<Self>) -> Arc<dyn SessionStorageTrait> {
        self.sessions.clone()
    }

    fn as_callback_data_storage(self: Arc<Self>) -> Arc<dyn CallbackDataStorageTrait> {
        self.callback_data.clone()
    }
}
