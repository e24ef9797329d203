//! Read-only sentence catalog
//!
//! The catalog is content, not learner data: it ships with the app (see
//! `data/sentences.json`) or is loaded from a file, and is never written back.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::models::{Grade, Sentence};

const BUILTIN_CATALOG: &str = include_str!("../../data/sentences.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate sentence id: {0}")]
    DuplicateId(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Source of catalog sentences, in definition order
pub trait SentenceCatalog: Send + Sync {
    fn sentences(&self) -> &[Sentence];

    fn get(&self, id: &str) -> Option<&Sentence> {
        self.sentences().iter().find(|s| s.id == id)
    }

    /// Number of sentences counted toward a progress category.
    /// Categories that are not grades have no catalog items.
    fn total_for_category(&self, category: &str) -> usize {
        match category.parse::<Grade>() {
            Ok(grade) => self.sentences().iter().filter(|s| s.grade == grade).count(),
            Err(_) => 0,
        }
    }
}

/// Catalog held in memory with an id index
pub struct StaticCatalog {
    sentences: Vec<Sentence>,
    index: HashMap<String, usize>,
}

impl StaticCatalog {
    pub fn new(sentences: Vec<Sentence>) -> Result<Self> {
        let mut index = HashMap::with_capacity(sentences.len());
        let mut sentences = sentences;
        for (pos, sentence) in sentences.iter_mut().enumerate() {
            sentence.is_important = false;
            if index.insert(sentence.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(sentence.id.clone()));
            }
        }
        Ok(Self { sentences, index })
    }

    /// The catalog bundled with the app
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let sentences: Vec<Sentence> = serde_json::from_str(json)?;
        Self::new(sentences)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        log::info!(
            "Catalog: loaded {} sentences from {:?}",
            catalog.sentences.len(),
            path
        );
        Ok(catalog)
    }
}

impl SentenceCatalog for StaticCatalog {
    fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    fn get(&self, id: &str) -> Option<&Sentence> {
        self.index.get(id).map(|&pos| &self.sentences[pos])
    }
}
