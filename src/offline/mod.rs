//! Offline cache worker
//!
//! This module provides:
//! - Request classification (document, script, style, image, other)
//! - Named cache partitions with version-based invalidation
//! - Network-first and cache-first retrieval
//! - The install/activate lifecycle that precaches the app shell

pub mod classify;
pub mod fetcher;
pub mod models;
pub mod partition;
pub mod worker;

pub use classify::{classify, strategy_for, ResourceKind, Strategy};
pub use fetcher::{Fetcher, HttpFetcher, NetworkError};
pub use models::{Destination, Request, RequestMode, Response};
pub use partition::CacheStorage;
pub use worker::{CacheError, OfflineWorker, WorkerState};
