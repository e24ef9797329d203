//! Durable key-value media backing the persisted store.
//!
//! A medium behaves like browser local storage: string keys, string values,
//! and a total size budget. Sizes are counted as `key.len() + value.len()`
//! bytes for every stored item.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Quota exceeded writing {key}: {attempted} bytes over a {limit} byte limit")]
    QuotaExceeded {
        key: String,
        attempted: usize,
        limit: usize,
    },

    #[error("Medium lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, MediumError>;

/// Key-value storage with a size quota
pub trait StorageMedium: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value in a single operation. Fails with
    /// [`MediumError::QuotaExceeded`] without modifying anything when the
    /// write would exceed the quota.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;

    /// Total bytes stored across all items
    fn used_bytes(&self) -> Result<usize> {
        let mut total = 0;
        for key in self.keys()? {
            if let Some(value) = self.get(&key)? {
                total += key.len() + value.len();
            }
        }
        Ok(total)
    }
}

/// `existing` and `entry_size` must be measured the same way as `used`.
fn check_quota(
    quota: Option<usize>,
    used: usize,
    existing: usize,
    key: &str,
    entry_size: usize,
) -> Result<()> {
    if let Some(limit) = quota {
        let attempted = used.saturating_sub(existing) + entry_size;
        if attempted > limit {
            return Err(MediumError::QuotaExceeded {
                key: key.to_string(),
                attempted,
                limit,
            });
        }
    }
    Ok(())
}

// ===== In-memory medium =====

/// In-memory medium, mostly for tests and embedding
#[derive(Default)]
pub struct MemoryMedium {
    items: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(|_| MediumError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| MediumError::Poisoned)?;
        let used: usize = items.iter().map(|(k, v)| k.len() + v.len()).sum();
        let existing = items.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
        check_quota(self.quota, used, existing, key, key.len() + value.len())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| MediumError::Poisoned)?;
        items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let items = self.items.read().map_err(|_| MediumError::Poisoned)?;
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

// ===== File-backed medium =====

/// Directory-backed medium: one file per key
///
/// ```text
/// {base_path}/
/// ├── flashdeck.data.json
/// └── importantSentences.json
/// ```
pub struct FileMedium {
    base_path: PathBuf,
    quota: Option<usize>,
}

const FILE_EXTENSION: &str = "json";

impl FileMedium {
    pub fn new(base_path: PathBuf, quota: Option<usize>) -> Result<Self> {
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path, quota })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", encode_key(key), FILE_EXTENSION))
    }
}

/// Keys are free-form strings; keep file names portable.
fn encode_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

impl StorageMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.quota.is_some() {
            // Sizes are counted with the on-disk key, as `keys()` reports it.
            let stored_key_len = encode_key(key).len();
            let used = self.used_bytes()?;
            let existing = self.get(key)?.map(|v| stored_key_len + v.len()).unwrap_or(0);
            check_quota(self.quota, used, existing, key, stored_key_len + value.len())?;
        }

        // Write to a sibling temp file and rename so readers never observe a
        // half-written value.
        let path = self.item_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.item_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == FILE_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
