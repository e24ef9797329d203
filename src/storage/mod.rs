pub mod backup;
pub mod medium;
pub mod migration;
mod models;
mod store;

pub use medium::{FileMedium, MediumError, MemoryMedium, StorageMedium};
pub use models::*;
pub use store::{
    is_evictable, PersistedStore, StoreError, CACHE_KEY_PREFIX, CORRUPT_KEY, DATA_KEY,
    LEGACY_IMPORTANT_KEY,
};
