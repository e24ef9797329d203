//! Study progress per category

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::streak::{advance_streak, progress_record, Clock};
use crate::sentences::SentenceCatalog;
use crate::storage::{PersistedStore, ProgressRecord, StoreError, StreakRecord};

type Result<T> = std::result::Result<T, StoreError>;

/// Progress for one category together with the learner's streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub completion_rate: u8,
    pub studied_count: usize,
    pub total_count: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_study_date: Option<NaiveDate>,
}

impl ProgressSnapshot {
    fn new(record: ProgressRecord, streak: StreakRecord) -> Self {
        Self {
            completion_rate: record.completion_rate,
            studied_count: record.studied_count,
            total_count: record.total_count,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            last_study_date: streak.last_study_date,
        }
    }
}

pub struct ProgressService {
    store: Arc<PersistedStore>,
    catalog: Arc<dyn SentenceCatalog>,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    pub fn new(
        store: Arc<PersistedStore>,
        catalog: Arc<dyn SentenceCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    /// Record that `item_id` was studied in `category`.
    ///
    /// Re-studying an item leaves the studied set as is but still counts as a
    /// study session for the streak. The completion rate is computed against
    /// the catalog as it is now.
    pub fn save_progress(&self, category: &str, item_id: &str) -> Result<ProgressSnapshot> {
        let total = self.catalog.total_for_category(category);
        let today = self.clock.today();

        self.store.update(|data| {
            let studied = data
                .studied_item_ids
                .entry(category.to_string())
                .or_default();
            studied.insert(item_id.to_string());

            let record = progress_record(studied.len(), total);
            data.progress_by_category
                .insert(category.to_string(), record);
            data.streak_data = advance_streak(data.streak_data, today);

            log::debug!(
                "Progress: {} {}/{} ({}%)",
                category,
                record.studied_count,
                record.total_count,
                record.completion_rate
            );
            ProgressSnapshot::new(record, data.streak_data)
        })
    }

    /// Stored progress for `category`; categories never studied read as zero
    pub fn get_progress(&self, category: &str) -> ProgressSnapshot {
        let data = self.store.load();
        let record = data
            .progress_by_category
            .get(category)
            .copied()
            .unwrap_or_default();
        ProgressSnapshot::new(record, data.streak_data)
    }

    pub fn get_all_progress(&self) -> BTreeMap<String, ProgressRecord> {
        self.store.load().progress_by_category
    }

    pub fn get_streak(&self) -> StreakRecord {
        self.store.load().streak_data
    }

    /// Forget everything studied in `category`. The streak is kept.
    pub fn reset_progress(&self, category: &str) -> Result<()> {
        self.store.update(|data| {
            data.studied_item_ids.remove(category);
            data.progress_by_category.remove(category);
        })
    }
}
