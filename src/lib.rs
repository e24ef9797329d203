use std::sync::Arc;

use thiserror::Error;

pub mod config;
pub mod offline;
pub mod preferences;
pub mod progress;
pub mod sentences;
pub mod storage;

use config::{AppConfig, ConfigError};
use preferences::PreferencesService;
use progress::{Clock, ProgressService, SystemClock};
use sentences::{CatalogError, DataService, SentenceCatalog, StaticCatalog};
use storage::{FileMedium, MediumError, MemoryMedium, PersistedStore, StorageMedium};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Medium(#[from] MediumError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Services sharing one store and one catalog
pub struct AppState {
    pub store: Arc<PersistedStore>,
    pub catalog: Arc<dyn SentenceCatalog>,
    pub preferences: PreferencesService,
    pub progress: ProgressService,
    pub data: DataService,
}

impl AppState {
    pub fn new(
        medium: Arc<dyn StorageMedium>,
        catalog: Arc<dyn SentenceCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(PersistedStore::new(medium));
        Self {
            preferences: PreferencesService::new(Arc::clone(&store)),
            progress: ProgressService::new(Arc::clone(&store), Arc::clone(&catalog), clock),
            data: DataService::new(Arc::clone(&store), Arc::clone(&catalog)),
            store,
            catalog,
        }
    }

    /// Open on-disk storage as described by `config`
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        let data_dir = config.resolve_data_dir()?;
        let medium = FileMedium::new(data_dir.join("storage"), config.quota())?;

        let catalog = match &config.catalog_path {
            Some(path) => StaticCatalog::from_file(path)?,
            None => StaticCatalog::builtin()?,
        };

        log::info!("Opened data directory {:?}", data_dir);
        Ok(Self::new(
            Arc::new(medium),
            Arc::new(catalog),
            Arc::new(SystemClock),
        ))
    }

    /// Fresh in-memory state with the built-in catalog
    pub fn in_memory(clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Ok(Self::new(
            Arc::new(MemoryMedium::new()),
            Arc::new(StaticCatalog::builtin()?),
            clock,
        ))
    }
}
