//! Persisted data model
//!
//! Everything the app remembers about a learner lives in one [`CompleteData`]
//! aggregate, serialized as a single JSON blob.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Schema version written by this build
pub const CURRENT_VERSION: &str = "2.0";

/// Speed used when sentences are auto-played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutoPlaySpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl AutoPlaySpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }
}

impl std::str::FromStr for AutoPlaySpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "normal" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            other => Err(format!("unknown auto-play speed: {}", other)),
        }
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub auto_play_speed: AutoPlaySpeed,
    pub tts_voice_index: u32,
    pub sound_enabled: bool,
    pub animations_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_play_speed: AutoPlaySpeed::Normal,
            tts_voice_index: 0,
            sound_enabled: true,
            animations_enabled: true,
        }
    }
}

/// Completion for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Whole percent, 0-100
    pub completion_rate: u8,
    pub studied_count: usize,
    pub total_count: usize,
}

/// Daily study streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_study_date: Option<NaiveDate>,
}

/// Aggregate root persisted as one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteData {
    pub version: String,
    pub important_sentence_ids: BTreeSet<String>,
    pub user_preferences: Preferences,
    pub progress_by_category: BTreeMap<String, ProgressRecord>,
    pub studied_item_ids: BTreeMap<String, BTreeSet<String>>,
    pub streak_data: StreakRecord,
}

impl Default for CompleteData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            important_sentence_ids: BTreeSet::new(),
            user_preferences: Preferences::default(),
            progress_by_category: BTreeMap::new(),
            studied_item_ids: BTreeMap::new(),
            streak_data: StreakRecord::default(),
        }
    }
}

/// Result of a diagnostic scan of the medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    /// Bytes used by every stored item, keys included
    pub total_size: usize,
    pub item_count: usize,
}
