//! English sentence catalog for flashcard study
//!
//! This module provides:
//! - The read-only sentence catalog, grouped by school grade
//! - Important-sentence marking backed by the persisted store
//! - Catalog statistics

pub mod catalog;
pub mod models;
pub mod service;

pub use catalog::{CatalogError, SentenceCatalog, StaticCatalog};
pub use models::*;
pub use service::DataService;
