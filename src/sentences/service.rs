//! Sentence lookups and the learner's important set

use std::collections::BTreeSet;
use std::sync::Arc;

use super::catalog::SentenceCatalog;
use super::models::{Grade, GradeStats, Sentence, Statistics};
use crate::storage::{PersistedStore, StoreError};

type Result<T> = std::result::Result<T, StoreError>;

/// Catalog access joined with the important-sentence set in the store
pub struct DataService {
    store: Arc<PersistedStore>,
    catalog: Arc<dyn SentenceCatalog>,
}

impl DataService {
    pub fn new(store: Arc<PersistedStore>, catalog: Arc<dyn SentenceCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn SentenceCatalog> {
        &self.catalog
    }

    fn important_ids(&self) -> BTreeSet<String> {
        self.store.load().important_sentence_ids
    }

    fn marked(sentence: &Sentence, important: &BTreeSet<String>) -> Sentence {
        let mut sentence = sentence.clone();
        sentence.is_important = important.contains(&sentence.id);
        sentence
    }

    /// Sentences for a grade in catalog order
    pub fn get_sentences_by_grade(&self, grade: Grade) -> Vec<Sentence> {
        let important = self.important_ids();
        self.catalog
            .sentences()
            .iter()
            .filter(|s| s.grade == grade)
            .map(|s| Self::marked(s, &important))
            .collect()
    }

    pub fn get_sentence(&self, id: &str) -> Option<Sentence> {
        let important = self.important_ids();
        self.catalog.get(id).map(|s| Self::marked(s, &important))
    }

    pub fn is_important(&self, id: &str) -> bool {
        self.important_ids().contains(id)
    }

    /// Flip membership of `id` in the important set and persist.
    /// Returns whether the id is important afterwards.
    pub fn toggle_important(&self, id: &str) -> Result<bool> {
        self.store.update(|data| {
            let ids = &mut data.important_sentence_ids;
            if ids.remove(id) {
                false
            } else {
                ids.insert(id.to_string());
                true
            }
        })
    }

    /// Important sentences in catalog order; ids missing from the catalog
    /// are skipped
    pub fn get_important_sentences(&self) -> Vec<Sentence> {
        let important = self.important_ids();
        self.catalog
            .sentences()
            .iter()
            .filter(|s| important.contains(&s.id))
            .map(|s| Self::marked(s, &important))
            .collect()
    }

    /// Remove every id from the important set
    pub fn clear_important(&self) -> Result<usize> {
        self.store.update(|data| {
            let removed = data.important_sentence_ids.len();
            data.important_sentence_ids.clear();
            removed
        })
    }

    pub fn get_statistics(&self) -> Statistics {
        let important = self.important_ids();
        let mut stats = Statistics::default();

        for grade in Grade::ALL {
            stats.by_grade.insert(grade, GradeStats::default());
        }

        for sentence in self.catalog.sentences() {
            let entry = stats.by_grade.entry(sentence.grade).or_default();
            entry.total += 1;
            stats.total_sentences += 1;
            if important.contains(&sentence.id) {
                entry.important += 1;
                stats.total_important += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentences::catalog::StaticCatalog;
    use crate::storage::MemoryMedium;

    fn create_test_service() -> DataService {
        let store = Arc::new(PersistedStore::new(Arc::new(MemoryMedium::new())));
        let catalog = Arc::new(StaticCatalog::builtin().unwrap());
        DataService::new(store, catalog)
    }

    #[test]
    fn test_sentences_by_grade_keep_catalog_order() {
        let service = create_test_service();
        let sentences = service.get_sentences_by_grade(Grade::Middle1);

        assert!(!sentences.is_empty());
        assert!(sentences.iter().all(|s| s.grade == Grade::Middle1));

        let catalog_ids: Vec<&str> = service
            .catalog()
            .sentences()
            .iter()
            .filter(|s| s.grade == Grade::Middle1)
            .map(|s| s.id.as_str())
            .collect();
        let ids: Vec<&str> = sentences.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, catalog_ids);
    }

    #[test]
    fn test_toggle_marks_and_resolves_important() {
        let service = create_test_service();
        let first = service.get_sentences_by_grade(Grade::Middle1)[0].clone();

        assert!(service.toggle_important(&first.id).unwrap());

        let important = service.get_important_sentences();
        assert_eq!(important.len(), 1);
        assert_eq!(important[0].id, first.id);
        assert_eq!(important[0].korean, first.korean);
        assert_eq!(important[0].english, first.english);
        assert!(important[0].is_important);

        assert!(service.get_sentences_by_grade(Grade::Middle1)[0].is_important);
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let service = create_test_service();
        assert!(!service.is_important("h2-001"));

        service.toggle_important("h2-001").unwrap();
        assert!(!service.toggle_important("h2-001").unwrap());
        assert!(!service.is_important("h2-001"));
    }

    #[test]
    fn test_dangling_ids_are_skipped() {
        let service = create_test_service();
        service.toggle_important("retired-sentence").unwrap();
        service.toggle_important("h3-002").unwrap();

        let important = service.get_important_sentences();
        assert_eq!(important.len(), 1);
        assert_eq!(important[0].id, "h3-002");

        let stats = service.get_statistics();
        assert_eq!(stats.total_important, 1);
    }

    #[test]
    fn test_statistics() {
        let service = create_test_service();
        service.toggle_important("m1-001").unwrap();
        service.toggle_important("m1-002").unwrap();
        service.toggle_important("h1-001").unwrap();

        let stats = service.get_statistics();
        assert_eq!(stats.total_sentences, service.catalog().sentences().len());
        assert_eq!(stats.total_important, 3);
        assert_eq!(stats.by_grade[&Grade::Middle1].important, 2);
        assert_eq!(stats.by_grade[&Grade::High1].important, 1);
        assert_eq!(stats.by_grade[&Grade::High3].important, 0);
        assert_eq!(stats.by_grade.len(), Grade::ALL.len());
    }

    #[test]
    fn test_clear_important() {
        let service = create_test_service();
        service.toggle_important("m2-001").unwrap();
        service.toggle_important("m2-002").unwrap();

        assert_eq!(service.clear_important().unwrap(), 2);
        assert!(service.get_important_sentences().is_empty());
    }
}
