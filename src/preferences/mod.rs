//! Typed access to the learner's settings
//!
//! Every setter is one load-mutate-save cycle through the store that touches
//! only its own field.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{AutoPlaySpeed, PersistedStore, Preferences, StoreError};

type Result<T> = std::result::Result<T, StoreError>;

/// Partial update; `None` fields are left as they are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub auto_play_speed: Option<AutoPlaySpeed>,
    pub tts_voice_index: Option<u32>,
    pub sound_enabled: Option<bool>,
    pub animations_enabled: Option<bool>,
}

pub struct PreferencesService {
    store: Arc<PersistedStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<PersistedStore>) -> Self {
        Self { store }
    }

    pub fn get_all_preferences(&self) -> Preferences {
        self.store.load().user_preferences
    }

    fn set<F>(&self, apply: F) -> Result<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        self.store.update(|data| {
            apply(&mut data.user_preferences);
            data.user_preferences.clone()
        })
    }

    pub fn set_auto_play_speed(&self, speed: AutoPlaySpeed) -> Result<Preferences> {
        self.set(|prefs| prefs.auto_play_speed = speed)
    }

    pub fn set_tts_voice_index(&self, index: u32) -> Result<Preferences> {
        self.set(|prefs| prefs.tts_voice_index = index)
    }

    pub fn set_sound_enabled(&self, enabled: bool) -> Result<Preferences> {
        self.set(|prefs| prefs.sound_enabled = enabled)
    }

    pub fn set_animations_enabled(&self, enabled: bool) -> Result<Preferences> {
        self.set(|prefs| prefs.animations_enabled = enabled)
    }

    pub fn update_preferences(&self, update: PreferencesUpdate) -> Result<Preferences> {
        self.set(|prefs| {
            if let Some(speed) = update.auto_play_speed {
                prefs.auto_play_speed = speed;
            }
            if let Some(index) = update.tts_voice_index {
                prefs.tts_voice_index = index;
            }
            if let Some(enabled) = update.sound_enabled {
                prefs.sound_enabled = enabled;
            }
            if let Some(enabled) = update.animations_enabled {
                prefs.animations_enabled = enabled;
            }
        })
    }

    pub fn reset_preferences(&self) -> Result<Preferences> {
        self.set(|prefs| *prefs = Preferences::default())
    }
}
