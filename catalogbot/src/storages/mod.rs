mod catalog_storage;
mod postgrest_storage;
mod session_storage;
mod storage;

pub use catalog_storage::{
    CatalogEntry, CatalogStorageTrait, EpisodeSummary, MemoryCatalogStorage,
    RepositoryError,
};
pub use postgrest_storage::PostgrestCatalogStorage;
pub use session_storage::{SessionFlags, SessionStorage, SessionStorageTrait};
pub use storage::{Storage, StorageTrait};

#[cfg(test)]
pub(crate) use catalog_storage::tests::{entry, sample_catalog};
