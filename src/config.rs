//! Application configuration
//!
//! Read from an optional TOML file; anything missing falls back to defaults.
//!
//! ```toml
//! data_dir = "/home/me/.local/share/flashdeck"
//! quota_bytes = 5242880
//! catalog_path = "/home/me/sentences.json"
//!
//! [cache]
//! origin = "https://cards.example.com"
//! version = "v2"
//! app_shell = ["/", "/index.html", "/manifest.json"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "FLASHDECK_CONFIG";

/// Conventional browser local-storage budget
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Offline cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Origin relative request paths are resolved against
    pub origin: String,
    /// Suffix of the partition names; bump it to drop every cached entry
    pub version: String,
    /// Paths precached into the static partition on install
    pub app_shell: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5173".to_string(),
            version: "v2".to_string(),
            app_shell: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
                "/icons/icon-192.png".to_string(),
                "/icons/icon-512.png".to_string(),
            ],
        }
    }
}

impl CacheConfig {
    pub fn static_cache_name(&self) -> String {
        format!("static-{}", self.version)
    }

    pub fn dynamic_cache_name(&self) -> String {
        format!("dynamic-{}", self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for stored data; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Storage budget in bytes; `0` disables the limit
    pub quota_bytes: usize,
    /// External sentence catalog; the built-in one when unset
    pub catalog_path: Option<PathBuf>,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            catalog_path: None,
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or return defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        log::info!("Config: loaded {:?}", path);
        Ok(config)
    }

    /// Load from an explicit path, else `$FLASHDECK_CONFIG`, else the default
    /// location in the platform config directory
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        match dirs::config_dir() {
            Some(dir) => Self::load(&dir.join("flashdeck").join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Where stored data lives
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|p| p.join("flashdeck"))
                .ok_or(ConfigError::DataDirNotFound),
        }
    }

    pub fn quota(&self) -> Option<usize> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }

    pub fn backup_dir(&self) -> Result<PathBuf> {
        Ok(self.resolve_data_dir()?.join("backups"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.quota(), Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
quota_bytes = 0

[cache]
version = "v3"
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.quota(), None);
        assert_eq!(config.cache.static_cache_name(), "static-v3");
        assert_eq!(config.cache.dynamic_cache_name(), "dynamic-v3");
        assert_eq!(config.cache.app_shell, CacheConfig::default().app_shell);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "quota_bytes = \"lots\"").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_explicit_data_dir() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/flashdeck-test")),
            ..Default::default()
        };
        assert_eq!(
            config.backup_dir().unwrap(),
            PathBuf::from("/tmp/flashdeck-test/backups")
        );
    }
}
