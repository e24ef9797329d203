//! Versioned persistence of the [`CompleteData`] aggregate.
//!
//! The store is the single gateway to the medium: services never keep their
//! own copies of learner data, they run read-modify-write cycles through
//! [`PersistedStore::update`], which serializes them behind one lock.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use thiserror::Error;

use super::medium::{MediumError, StorageMedium};
use super::migration::{self, MigrationError};
use super::models::{CompleteData, StorageInfo, CURRENT_VERSION};

/// Key holding the serialized [`CompleteData`]
pub const DATA_KEY: &str = "flashdeck.data";
/// Important-sentence ids from before they moved into the main blob
pub const LEGACY_IMPORTANT_KEY: &str = "importantSentences";
/// Unreadable blobs are moved here instead of being overwritten silently
pub const CORRUPT_KEY: &str = "flashdeck.data.corrupt";
/// Prefix for keys that hold regenerable cached data
pub const CACHE_KEY_PREFIX: &str = "cache.";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage medium error: {0}")]
    Medium(#[from] MediumError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored data is corrupt: {0}")]
    CorruptData(String),

    #[error("Storage quota exceeded, changes could not be saved")]
    QuotaExceeded,

    #[error("Invalid import: {0}")]
    Validation(String),
}

impl From<MigrationError> for StoreError {
    fn from(err: MigrationError) -> Self {
        Self::CorruptData(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Top-level fields an import must carry, with their JSON type and the
/// version that introduced them
const REQUIRED_FIELDS: &[(&str, JsonKind, &str)] = &[
    ("importantSentenceIds", JsonKind::Array, "1.0"),
    ("userPreferences", JsonKind::Object, "1.0"),
    ("progressByCategory", JsonKind::Object, "1.1"),
    ("studiedItemIds", JsonKind::Object, "1.1"),
    ("streakData", JsonKind::Object, "2.0"),
];

#[derive(Debug, Clone, Copy)]
enum JsonKind {
    Array,
    Object,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Whether a key may be dropped to make room for the main blob
pub fn is_evictable(key: &str) -> bool {
    key.starts_with(CACHE_KEY_PREFIX) || key == CORRUPT_KEY
}

pub struct PersistedStore {
    medium: Arc<dyn StorageMedium>,
    write_lock: Mutex<()>,
}

impl PersistedStore {
    pub fn new(medium: Arc<dyn StorageMedium>) -> Self {
        Self {
            medium,
            write_lock: Mutex::new(()),
        }
    }

    pub fn medium(&self) -> &Arc<dyn StorageMedium> {
        &self.medium
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ===== Load =====

    /// Read the current data, migrating older blobs forward.
    ///
    /// Never fails: unreadable data is quarantined and defaults are returned
    /// so a broken profile cannot block startup.
    pub fn load(&self) -> CompleteData {
        let _guard = self.lock();
        self.load_locked()
    }

    fn load_locked(&self) -> CompleteData {
        let raw = match self.medium.get(DATA_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Store: failed to read {}: {}; using defaults", DATA_KEY, e);
                return CompleteData::default();
            }
        };

        match self.decode_stored(raw.as_deref()) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Store: {}; falling back to defaults", e);
                if let Some(raw) = raw {
                    if let Err(e) = self.medium.set(CORRUPT_KEY, &raw) {
                        log::warn!("Store: could not quarantine corrupt data: {}", e);
                    }
                }
                CompleteData::default()
            }
        }
    }

    fn decode_stored(&self, raw: Option<&str>) -> Result<CompleteData> {
        let legacy_ids = self.read_legacy_ids();

        let Some(raw) = raw else {
            let mut data = CompleteData::default();
            if let Some(ids) = legacy_ids {
                data.important_sentence_ids.extend(ids);
                self.persist_after_load(&data, true);
            }
            return Ok(data);
        };

        let value: Value =
            serde_json::from_str(raw).map_err(|e| StoreError::CorruptData(e.to_string()))?;
        let (mut value, applied) = migration::migrate(value)?;

        if let Some(ids) = &legacy_ids {
            let added = migration::fold_legacy_important(&mut value, ids)?;
            log::info!("Store: folded {} legacy important ids into main data", added);
        }

        let data: CompleteData =
            serde_json::from_value(value).map_err(|e| StoreError::CorruptData(e.to_string()))?;

        if !applied.is_empty() || legacy_ids.is_some() {
            self.persist_after_load(&data, legacy_ids.is_some());
        }

        Ok(data)
    }

    /// Write back data that load had to transform. A failure here only costs
    /// repeating the transform on the next load.
    fn persist_after_load(&self, data: &CompleteData, drop_legacy: bool) {
        match self.save_locked(data) {
            Ok(()) => {
                if drop_legacy {
                    if let Err(e) = self.medium.remove(LEGACY_IMPORTANT_KEY) {
                        log::warn!("Store: could not remove legacy key: {}", e);
                    }
                }
            }
            Err(e) => log::warn!("Store: could not persist migrated data: {}", e),
        }
    }

    fn read_legacy_ids(&self) -> Option<Vec<String>> {
        let raw = match self.medium.get(LEGACY_IMPORTANT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Store: failed to read legacy important ids: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Some(ids),
            Err(e) => {
                log::warn!("Store: ignoring unreadable legacy important ids: {}", e);
                None
            }
        }
    }

    // ===== Save =====

    /// Persist `data` at the current schema version in a single write.
    ///
    /// When the medium is full, evicts non-essential keys once and retries;
    /// a second rejection is reported as [`StoreError::QuotaExceeded`].
    pub fn save(&self, data: &CompleteData) -> Result<()> {
        let _guard = self.lock();
        self.save_locked(data)
    }

    fn save_locked(&self, data: &CompleteData) -> Result<()> {
        let json = if data.version == CURRENT_VERSION {
            serde_json::to_string(data)?
        } else {
            let mut normalized = data.clone();
            normalized.version = CURRENT_VERSION.to_string();
            serde_json::to_string(&normalized)?
        };

        match self.medium.set(DATA_KEY, &json) {
            Ok(()) => Ok(()),
            Err(MediumError::QuotaExceeded { attempted, limit, .. }) => {
                log::warn!(
                    "Store: quota exceeded ({} > {} bytes), evicting cached keys",
                    attempted,
                    limit
                );
                let evicted = self.evict_non_essential()?;
                log::warn!("Store: evicted {} keys, retrying save", evicted);

                match self.medium.set(DATA_KEY, &json) {
                    Ok(()) => Ok(()),
                    Err(MediumError::QuotaExceeded { .. }) => Err(StoreError::QuotaExceeded),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every evictable key. Returns how many were removed.
    fn evict_non_essential(&self) -> Result<usize> {
        let mut evicted = 0;
        for key in self.medium.keys()? {
            if is_evictable(&key) {
                self.medium.remove(&key)?;
                log::debug!("Store: evicted {}", key);
                evicted += 1;
            }
        }
        Ok(evicted)
    }

    /// Load, mutate, and save as one serialized step.
    ///
    /// Concurrent callers queue on the store lock, so no update is lost to an
    /// interleaved load/save from another service.
    pub fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut CompleteData) -> T,
    {
        let _guard = self.lock();
        let mut data = self.load_locked();
        let out = mutate(&mut data);
        self.save_locked(&data)?;
        Ok(out)
    }

    /// Drop the main blob; the next load starts from defaults
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock();
        self.medium.remove(DATA_KEY)?;
        Ok(())
    }

    // ===== Export / Import =====

    /// Serialize the full data set, version included, for backup
    pub fn export_data(&self) -> Result<String> {
        let data = self.load();
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Check that `serialized` is a complete, well-typed data set.
    ///
    /// Every field defined at the payload's own version must be present with
    /// the right JSON type; older exports are migrated afterwards.
    pub fn validate_import(serialized: &str) -> Result<CompleteData> {
        let value: Value = serde_json::from_str(serialized)
            .map_err(|e| StoreError::Validation(format!("not valid JSON: {}", e)))?;

        if !value.get("version").map_or(false, Value::is_string) {
            return Err(StoreError::Validation("missing version".to_string()));
        }
        let version = migration::version_of(&value)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let rank = migration::version_rank(&version)
            .ok_or_else(|| StoreError::Validation(format!("unknown version {}", version)))?;

        // Checked against the payload as written, before migration fills gaps
        for (field, kind, since) in REQUIRED_FIELDS {
            if migration::version_rank(since).map_or(false, |since| since > rank) {
                continue;
            }
            match value.get(*field) {
                Some(v) if kind.matches(v) => {}
                Some(_) => {
                    return Err(StoreError::Validation(format!(
                        "field {} has the wrong type",
                        field
                    )))
                }
                None => {
                    return Err(StoreError::Validation(format!("missing field {}", field)))
                }
            }
        }

        let (value, _) =
            migration::migrate(value).map_err(|e| StoreError::Validation(e.to_string()))?;

        let data: CompleteData = serde_json::from_value(value)
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        if let Some((category, _)) = data
            .progress_by_category
            .iter()
            .find(|(_, record)| record.completion_rate > 100)
        {
            return Err(StoreError::Validation(format!(
                "completion rate over 100 for {}",
                category
            )));
        }

        log::debug!("Store: validated import at version {}", version);
        Ok(data)
    }

    /// Replace all data with an export. Returns `false`, leaving current data
    /// untouched, when the payload is invalid or cannot be written.
    pub fn import_data(&self, serialized: &str) -> bool {
        match self.try_import(serialized) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Store: import rejected: {}", e);
                false
            }
        }
    }

    /// Like [`import_data`](Self::import_data) but reports why an import failed
    pub fn try_import(&self, serialized: &str) -> Result<()> {
        let data = Self::validate_import(serialized)?;
        self.save(&data)
    }

    // ===== Diagnostics =====

    /// Size and item count of everything on the medium
    pub fn storage_info(&self) -> Result<StorageInfo> {
        let keys = self.medium.keys()?;
        let total_size = self.medium.used_bytes()?;
        Ok(StorageInfo {
            total_size,
            item_count: keys.len(),
        })
    }
}
