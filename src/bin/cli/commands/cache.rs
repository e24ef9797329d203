use std::sync::Arc;

use anyhow::{Context, Result};

use flashdeck_lib::offline::{
    classify, strategy_for, CacheStorage, HttpFetcher, OfflineWorker, Request,
};

use crate::app::App;
use crate::OutputFormat;

/// Run install and activate against the live origin and report what was cached
pub fn run_check(app: &App, format: &OutputFormat) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let worker = OfflineWorker::new(
        &app.config.cache,
        Arc::new(CacheStorage::new()),
        Arc::new(fetcher),
    )?;

    let (removed, root) = runtime.block_on(async {
        worker.install().await?;
        let removed = worker.activate().await?;
        let root = worker.handle_fetch(&Request::navigate("/")).await;
        Ok::<_, anyhow::Error>((removed, root))
    })?;

    let cached = worker.caches().keys(worker.static_cache_name());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "origin": app.config.cache.origin,
                "state": worker.state(),
                "staticCache": worker.static_cache_name(),
                "cached": cached,
                "removedCaches": removed,
                "rootStatus": root.status,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Origin: {}", app.config.cache.origin);
            println!("State:  {:?}", worker.state());
            println!("\n{} ({} entries)", worker.static_cache_name(), cached.len());
            for key in &cached {
                println!("  {}", key);
            }
            println!("\nGET / -> {} {}", root.status, root.status_text);
        }
    }

    Ok(())
}

pub fn run_classify(url: &str, method: &str, format: &OutputFormat) -> Result<()> {
    let request = Request::get(url).with_method(method.to_uppercase());
    let kind = classify(&request);
    let strategy = strategy_for(&request);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "url": url,
                "method": request.method,
                "kind": kind,
                "strategy": strategy,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{} {}", request.method, url);
            println!("  kind:     {:?}", kind);
            println!("  strategy: {:?}", strategy);
        }
    }

    Ok(())
}
