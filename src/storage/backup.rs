//! Export files on disk
//!
//! Backups are plain export JSON written to a directory as
//! `flashdeck-backup-YYYYMMDD-HHMMSS.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::medium::MediumError;
use super::store::{PersistedStore, Result};

const BACKUP_PREFIX: &str = "flashdeck-backup-";
const BACKUP_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A backup file found on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub path: PathBuf,
    pub created_at: DateTime<Local>,
    pub size: u64,
}

/// File name for a backup taken at `at`
pub fn backup_file_name(at: DateTime<Local>) -> String {
    format!("{}{}.json", BACKUP_PREFIX, at.format(BACKUP_TIME_FORMAT))
}

fn parse_backup_time(file_name: &str) -> Option<DateTime<Local>> {
    let stamp = file_name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(".json")?;
    let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single()
}

/// Write the current export into `backup_dir`
pub fn export_to_dir(store: &PersistedStore, backup_dir: &Path) -> Result<BackupInfo> {
    fs::create_dir_all(backup_dir).map_err(MediumError::from)?;

    let created_at = Local::now();
    let path = backup_dir.join(backup_file_name(created_at));
    let size = export_to_file(store, &path)?;

    log::info!("Backup: wrote {:?} ({} bytes)", path, size);
    Ok(BackupInfo {
        path,
        created_at,
        size,
    })
}

/// Write the current export to `path`, returning the bytes written
pub fn export_to_file(store: &PersistedStore, path: &Path) -> Result<u64> {
    let exported = store.export_data()?;
    fs::write(path, &exported).map_err(MediumError::from)?;
    Ok(exported.len() as u64)
}

/// Replace current data with the export in `path`
pub fn import_from_file(store: &PersistedStore, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path).map_err(MediumError::from)?;
    store.try_import(&content)
}

/// Backups in `backup_dir`, newest first
pub fn list_backups(backup_dir: &Path) -> Result<Vec<BackupInfo>> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    let entries = fs::read_dir(backup_dir).map_err(MediumError::from)?;
    for entry in entries {
        let entry = entry.map_err(MediumError::from)?;
        let path = entry.path();
        let Some(created_at) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_backup_time)
        else {
            continue;
        };
        let size = entry
            .metadata()
            .map_err(MediumError::from)?
            .len();
        backups.push(BackupInfo {
            path,
            created_at,
            size,
        });
    }

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(backups)
}
