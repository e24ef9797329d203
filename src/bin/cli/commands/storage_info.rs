use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let info = app
        .state
        .store
        .storage_info()
        .context("Failed to scan storage")?;
    let data_dir = app.config.resolve_data_dir()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dataDir": data_dir,
                "totalSize": info.total_size,
                "itemCount": info.item_count,
                "quotaBytes": app.config.quota(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Data dir:  {}", data_dir.display());
            println!("Items:     {}", info.item_count);
            match app.config.quota() {
                Some(quota) => println!("Used:      {} / {} bytes", info.total_size, quota),
                None => println!("Used:      {} bytes (no quota)", info.total_size),
            }
        }
    }

    Ok(())
}
