use std::path::Path;

use anyhow::{bail, Context, Result};

use flashdeck_lib::config::AppConfig;
use flashdeck_lib::sentences::{Grade, Sentence};
use flashdeck_lib::AppState;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub state: AppState,
}

impl App {
    /// Initialize from the discovered config file
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::discover(config_path).context("Failed to load config")?;
        let state = AppState::open(&config).context("Failed to open data directory")?;
        Ok(Self { config, state })
    }

    /// Parse a grade name (case-insensitive)
    pub fn parse_grade(&self, name: &str) -> Result<Grade> {
        match name.parse::<Grade>() {
            Ok(grade) => Ok(grade),
            Err(_) => bail!(
                "Unknown grade '{}'. Available grades:\n{}",
                name,
                Grade::ALL
                    .iter()
                    .map(|g| format!("  - {}", g))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    /// Look up a sentence by id
    pub fn find_sentence(&self, id: &str) -> Result<Sentence> {
        self.state
            .data
            .get_sentence(id)
            .with_context(|| format!("No sentence with id '{}'", id))
    }
}
