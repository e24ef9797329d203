use std::path::Path;

use anyhow::{Context, Result};

use flashdeck_lib::storage::backup;

use crate::app::App;
use crate::OutputFormat;

pub fn run_export(app: &App, file: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let store = &app.state.store;

    let (path, size) = match file {
        Some(path) => {
            let size = backup::export_to_file(store, path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            (path.to_path_buf(), size)
        }
        None => {
            let dir = app.config.backup_dir()?;
            let info = backup::export_to_dir(store, &dir)
                .with_context(|| format!("Failed to export to {}", dir.display()))?;
            (info.path, info.size)
        }
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path,
                "size": size,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Exported {} bytes to {}", size, path.display());
        }
    }

    Ok(())
}

pub fn run_import(app: &App, file: &Path, format: &OutputFormat) -> Result<()> {
    backup::import_from_file(&app.state.store, file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "imported": file }));
        }
        OutputFormat::Plain => {
            println!("Imported {}", file.display());
        }
    }

    Ok(())
}

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let dir = app.config.backup_dir()?;
    let backups = backup::list_backups(&dir).context("Failed to list backups")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&backups)?);
        }
        OutputFormat::Plain => {
            if backups.is_empty() {
                println!("No backups in {}.", dir.display());
                return Ok(());
            }

            for info in &backups {
                println!(
                    "{}  {:>8} bytes  {}",
                    info.created_at.format("%Y-%m-%d %H:%M:%S"),
                    info.size,
                    info.path.display()
                );
            }
        }
    }

    Ok(())
}
