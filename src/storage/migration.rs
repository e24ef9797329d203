//! Forward migration of stored blobs to the current schema version.
//!
//! Each step is a pure transform from the blob at one version to the blob at
//! the next. Steps run in table order until the blob reaches
//! [`CURRENT_VERSION`]. A blob without a `version` field predates versioning
//! and is treated as `1.0`.
//!
//! | version | adds                                              |
//! |---------|---------------------------------------------------|
//! | 1.0     | `importantSentenceIds`, `userPreferences`         |
//! | 1.1     | `progressByCategory`, `studiedItemIds`, `userPreferences.animationsEnabled` |
//! | 2.0     | `streakData`                                      |

use serde_json::{json, Map, Value};
use thiserror::Error;

use super::models::CURRENT_VERSION;

/// Version assumed for blobs written before versioning existed
pub const UNVERSIONED: &str = "1.0";

#[derive(Error, Debug, PartialEq)]
pub enum MigrationError {
    #[error("Stored data is not a JSON object")]
    NotAnObject,

    #[error("Version field is not a string")]
    InvalidVersion,

    #[error("No migration from version {0}")]
    UnknownVersion(String),
}

type Step = fn(Map<String, Value>) -> Map<String, Value>;

const MIGRATIONS: &[(&str, &str, Step)] = &[
    ("1.0", "1.1", v1_0_to_v1_1),
    ("1.1", "2.0", v1_1_to_v2_0),
];

/// Read the version tag of a raw blob
pub fn version_of(value: &Value) -> Result<String, MigrationError> {
    let obj = value.as_object().ok_or(MigrationError::NotAnObject)?;
    match obj.get("version") {
        None | Some(Value::Null) => Ok(UNVERSIONED.to_string()),
        Some(Value::String(v)) => Ok(v.clone()),
        Some(_) => Err(MigrationError::InvalidVersion),
    }
}

/// Position of `version` along the chain; `None` for versions it does not know
pub fn version_rank(version: &str) -> Option<usize> {
    if version == CURRENT_VERSION {
        return Some(MIGRATIONS.len());
    }
    MIGRATIONS.iter().position(|(from, _, _)| *from == version)
}

/// Whether a blob at `version` needs to pass through the chain
pub fn needs_migration(version: &str) -> bool {
    version != CURRENT_VERSION
}

/// Bring a blob up to [`CURRENT_VERSION`].
///
/// Returns the migrated blob and the versions it passed through, in order.
pub fn migrate(value: Value) -> Result<(Value, Vec<String>), MigrationError> {
    let mut version = version_of(&value)?;
    let mut obj = match value {
        Value::Object(obj) => obj,
        _ => return Err(MigrationError::NotAnObject),
    };

    let mut applied = Vec::new();
    while needs_migration(&version) {
        let (_, to, step) = MIGRATIONS
            .iter()
            .find(|(from, _, _)| *from == version)
            .ok_or_else(|| MigrationError::UnknownVersion(version.clone()))?;

        obj = step(obj);
        obj.insert("version".to_string(), Value::String(to.to_string()));
        log::info!("Migration: stored data {} -> {}", version, to);
        applied.push(to.to_string());
        version = to.to_string();
    }

    Ok((Value::Object(obj), applied))
}

/// Merge important-sentence ids from the legacy standalone key into a blob
/// of any version.
pub fn fold_legacy_important(value: &mut Value, legacy_ids: &[String]) -> Result<usize, MigrationError> {
    let obj = value.as_object_mut().ok_or(MigrationError::NotAnObject)?;
    let ids = obj
        .entry("importantSentenceIds")
        .or_insert_with(|| Value::Array(Vec::new()));

    if !ids.is_array() {
        *ids = Value::Array(Vec::new());
    }

    let mut added = 0;
    if let Value::Array(existing) = ids {
        for id in legacy_ids {
            let candidate = Value::String(id.clone());
            if !existing.contains(&candidate) {
                existing.push(candidate);
                added += 1;
            }
        }
    }
    Ok(added)
}

fn ensure(obj: &mut Map<String, Value>, key: &str, default: Value) {
    if obj.get(key).map_or(true, Value::is_null) {
        obj.insert(key.to_string(), default);
    }
}

fn v1_0_to_v1_1(mut obj: Map<String, Value>) -> Map<String, Value> {
    ensure(&mut obj, "importantSentenceIds", json!([]));
    ensure(
        &mut obj,
        "userPreferences",
        json!({
            "autoPlaySpeed": "normal",
            "ttsVoiceIndex": 0,
            "soundEnabled": true,
        }),
    );
    if let Some(Value::Object(prefs)) = obj.get_mut("userPreferences") {
        ensure(prefs, "animationsEnabled", json!(true));
    }
    ensure(&mut obj, "progressByCategory", json!({}));
    ensure(&mut obj, "studiedItemIds", json!({}));
    obj
}

fn v1_1_to_v2_0(mut obj: Map<String, Value>) -> Map<String, Value> {
    ensure(
        &mut obj,
        "streakData",
        json!({
            "currentStreak": 0,
            "longestStreak": 0,
            "lastStudyDate": null,
        }),
    );
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::CompleteData;

    #[test]
    fn test_version_rank_follows_chain() {
        assert_eq!(version_rank("1.0"), Some(0));
        assert_eq!(version_rank("1.1"), Some(1));
        assert_eq!(version_rank(CURRENT_VERSION), Some(2));
        assert_eq!(version_rank("9.9"), None);
    }

    #[test]
    fn test_current_version_is_untouched() {
        let value = serde_json::to_value(CompleteData::default()).unwrap();
        let (migrated, applied) = migrate(value.clone()).unwrap();
        assert!(applied.is_empty());
        assert_eq!(migrated, value);
    }

    #[test]
    fn test_v1_0_migrates_through_chain() {
        let v1 = json!({
            "version": "1.0",
            "importantSentenceIds": ["m1-001"],
            "userPreferences": {
                "autoPlaySpeed": "fast",
                "ttsVoiceIndex": 2,
                "soundEnabled": false
            }
        });

        let (migrated, applied) = migrate(v1).unwrap();
        assert_eq!(applied, vec!["1.1".to_string(), "2.0".to_string()]);

        let data: CompleteData = serde_json::from_value(migrated).unwrap();
        assert_eq!(data.version, CURRENT_VERSION);
        assert!(data.important_sentence_ids.contains("m1-001"));
        assert_eq!(data.user_preferences.tts_voice_index, 2);
        assert!(!data.user_preferences.sound_enabled);
        assert!(data.user_preferences.animations_enabled);
        assert_eq!(data.streak_data.current_streak, 0);
    }

    #[test]
    fn test_unversioned_blob_is_treated_as_v1_0() {
        let (migrated, applied) = migrate(json!({ "importantSentenceIds": [] })).unwrap();
        assert_eq!(applied.len(), 2);
        assert!(serde_json::from_value::<CompleteData>(migrated).is_ok());
    }

    #[test]
    fn test_unknown_version_fails() {
        let result = migrate(json!({ "version": "0.3" }));
        assert_eq!(result.unwrap_err(), MigrationError::UnknownVersion("0.3".to_string()));

        let newer = migrate(json!({ "version": "9.0" }));
        assert!(matches!(newer, Err(MigrationError::UnknownVersion(_))));
    }

    #[test]
    fn test_non_object_fails() {
        assert_eq!(migrate(json!([1, 2])).unwrap_err(), MigrationError::NotAnObject);
        assert_eq!(
            migrate(json!({ "version": 2 })).unwrap_err(),
            MigrationError::InvalidVersion
        );
    }

    #[test]
    fn test_fold_legacy_important_dedupes() {
        let mut value = json!({ "importantSentenceIds": ["a"] });
        let added = fold_legacy_important(&mut value, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(value["importantSentenceIds"], json!(["a", "b"]));
    }
}
