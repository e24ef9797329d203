//! Background cache worker
//!
//! Lifecycle:
//! ```text
//! parsed -> installing -> installed -> activating -> activated
//!               \
//!                `-> redundant (precache failed)
//! ```
//! `install` fills the static partition with the app shell, all or nothing.
//! `activate` deletes every partition not belonging to this version and
//! takes control of open clients. Fetches are only answered from the cache
//! once the worker is activated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classify::{classify, strategy_for, ResourceKind, Strategy};
use super::fetcher::Fetcher;
use super::models::{Request, Response};
use super::partition::CacheStorage;
use crate::config::CacheConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Precache of {url} failed: {reason}")]
    Install { url: String, reason: String },

    #[error("Cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: WorkerState,
    },

    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

pub struct OfflineWorker {
    origin: reqwest::Url,
    static_cache: String,
    dynamic_cache: String,
    app_shell: Vec<String>,
    caches: Arc<CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<WorkerState>,
    clients_claimed: AtomicBool,
}

impl OfflineWorker {
    pub fn new(
        config: &CacheConfig,
        caches: Arc<CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self> {
        let origin = reqwest::Url::parse(&config.origin)
            .map_err(|e| CacheError::InvalidOrigin(format!("{}: {}", config.origin, e)))?;

        Ok(Self {
            origin,
            static_cache: config.static_cache_name(),
            dynamic_cache: config.dynamic_cache_name(),
            app_shell: config.app_shell.clone(),
            caches,
            fetcher,
            state: RwLock::new(WorkerState::Parsed),
            clients_claimed: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: WorkerState) {
        log::debug!("Offline worker: {:?} -> {:?}", self.state(), state);
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn expect_state(&self, expected: WorkerState, action: &'static str) -> Result<()> {
        let state = self.state();
        if state != expected {
            return Err(CacheError::InvalidState { action, state });
        }
        Ok(())
    }

    pub fn caches(&self) -> &Arc<CacheStorage> {
        &self.caches
    }

    pub fn static_cache_name(&self) -> &str {
        &self.static_cache
    }

    pub fn dynamic_cache_name(&self) -> &str {
        &self.dynamic_cache
    }

    /// Whether open pages are routed through this worker
    pub fn controls_clients(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Absolute cache key for a request URL. Fragments never reach the
    /// network, so they are dropped.
    pub fn cache_key(&self, url: &str) -> String {
        match self.origin.join(url) {
            Ok(mut resolved) => {
                resolved.set_fragment(None);
                resolved.to_string()
            }
            Err(_) => url.to_string(),
        }
    }

    fn absolute(&self, request: &Request) -> Request {
        Request {
            url: self.cache_key(&request.url),
            ..request.clone()
        }
    }

    // ===== Lifecycle =====

    /// Precache the app shell into the static partition.
    ///
    /// Every shell entry must come back `ok`; otherwise nothing from this
    /// attempt is kept and the worker becomes redundant.
    pub async fn install(&self) -> Result<()> {
        self.expect_state(WorkerState::Parsed, "install")?;
        self.set_state(WorkerState::Installing);
        let had_static = self.caches.has(&self.static_cache);
        self.caches.open(&self.static_cache);

        let mut fetched = Vec::with_capacity(self.app_shell.len());
        for path in &self.app_shell {
            let request = self.absolute(&Request::get(path.as_str()));
            let result = self.fetcher.fetch(&request).await;
            let failure = match result {
                Ok(response) if response.ok() => {
                    fetched.push((request.url, response));
                    continue;
                }
                Ok(response) => format!("status {}", response.status),
                Err(e) => e.to_string(),
            };

            log::warn!("Offline worker: install failed on {}: {}", request.url, failure);
            // Fetched entries are staged and never stored; only drop a
            // partition this attempt created.
            if !had_static {
                self.caches.delete(&self.static_cache);
            }
            self.set_state(WorkerState::Redundant);
            return Err(CacheError::Install {
                url: request.url,
                reason: failure,
            });
        }

        let count = fetched.len();
        for (url, response) in fetched {
            self.caches.put(&self.static_cache, &url, response);
        }

        log::info!(
            "Offline worker: precached {} entries into {}",
            count,
            self.static_cache
        );
        self.set_state(WorkerState::Installed);
        Ok(())
    }

    /// Delete stale partitions and take control of open clients.
    /// Returns the names of the deleted partitions.
    pub async fn activate(&self) -> Result<Vec<String>> {
        self.expect_state(WorkerState::Installed, "activate")?;
        self.set_state(WorkerState::Activating);

        let allowed = [self.static_cache.as_str(), self.dynamic_cache.as_str()];
        let mut deleted = Vec::new();
        for name in self.caches.names() {
            if !allowed.contains(&name.as_str()) && self.caches.delete(&name) {
                log::info!("Offline worker: deleted stale cache {}", name);
                deleted.push(name);
            }
        }

        self.clients_claimed.store(true, Ordering::SeqCst);
        self.set_state(WorkerState::Activated);
        Ok(deleted)
    }

    // ===== Fetch handling =====

    /// Answer a request. Always produces a response: when neither network nor
    /// cache can help, a synthetic 503.
    pub async fn handle_fetch(&self, request: &Request) -> Response {
        let request = self.absolute(request);

        if self.state() != WorkerState::Activated {
            return self.network_only(&request).await;
        }

        match strategy_for(&request) {
            Strategy::NetworkFirst => self.network_first(&request).await,
            Strategy::CacheFirst => self.cache_first(&request).await,
            Strategy::NetworkOnly => self.network_only(&request).await,
        }
    }

    async fn network_only(&self, request: &Request) -> Response {
        match self.fetcher.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("Offline worker: {} unreachable: {}", request.url, e);
                Response::offline()
            }
        }
    }

    async fn network_first(&self, request: &Request) -> Response {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.remember(request, &response);
                response
            }
            Err(e) => {
                log::warn!(
                    "Offline worker: network failed for {}, trying cache: {}",
                    request.url,
                    e
                );
                self.best_cached_match(request)
                    .unwrap_or_else(Response::offline)
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Response {
        if let Some(cached) = self.caches.match_any(&request.url) {
            return cached;
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.remember(request, &response);
                response
            }
            Err(e) => {
                log::debug!("Offline worker: {} not cached and unreachable: {}", request.url, e);
                Response::offline()
            }
        }
    }

    /// Copy a successful response into the dynamic partition
    fn remember(&self, request: &Request, response: &Response) {
        if response.ok() {
            self.caches
                .put(&self.dynamic_cache, &request.url, response.clone());
        }
    }

    /// Exact URL first; documents fall back to the cached app shell
    fn best_cached_match(&self, request: &Request) -> Option<Response> {
        if let Some(cached) = self.caches.match_any(&request.url) {
            return Some(cached);
        }

        if classify(request) != ResourceKind::Document {
            return None;
        }

        ["/index.html", "/"]
            .iter()
            .find_map(|shell| self.caches.match_any(&self.cache_key(shell)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::fetcher::NetworkError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Scripted network: known URLs answer, everything else is unreachable
    #[derive(Default)]
    struct FakeNetwork {
        routes: Mutex<HashMap<String, Response>>,
        online: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeNetwork {
        fn online() -> Arc<Self> {
            let network = Self::default();
            network.online.store(true, Ordering::SeqCst);
            Arc::new(network)
        }

        fn route(&self, url: &str, response: Response) {
            self.routes.lock().unwrap().insert(url.to_string(), response);
        }

        fn go_offline(&self) {
            self.online.store(false, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for FakeNetwork {
        async fn fetch(&self, request: &Request) -> std::result::Result<Response, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.online.load(Ordering::SeqCst) {
                return Err(NetworkError::Unreachable);
            }
            Ok(self
                .routes
                .lock()
                .unwrap()
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| Response::new(404, "not found")))
        }
    }

    const ORIGIN: &str = "https://cards.test";

    fn config() -> CacheConfig {
        CacheConfig {
            origin: ORIGIN.to_string(),
            version: "v2".to_string(),
            app_shell: vec!["/".to_string(), "/index.html".to_string(), "/manifest.json".to_string()],
        }
    }

    fn network_with_shell() -> Arc<FakeNetwork> {
        let network = FakeNetwork::online();
        network.route("https://cards.test/", Response::new(200, "<html>root</html>"));
        network.route("https://cards.test/index.html", Response::new(200, "<html>shell</html>"));
        network.route("https://cards.test/manifest.json", Response::new(200, "{}"));
        network
    }

    async fn active_worker(network: Arc<FakeNetwork>) -> OfflineWorker {
        let worker = OfflineWorker::new(&config(), Arc::new(CacheStorage::new()), network).unwrap();
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        worker
    }

    #[tokio::test]
    async fn test_install_precaches_shell() {
        let network = network_with_shell();
        let worker = OfflineWorker::new(&config(), Arc::new(CacheStorage::new()), network).unwrap();
        assert_eq!(worker.state(), WorkerState::Parsed);

        worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);
        assert_eq!(
            worker.caches().keys("static-v2"),
            vec![
                "https://cards.test/".to_string(),
                "https://cards.test/index.html".to_string(),
                "https://cards.test/manifest.json".to_string(),
            ]
        );
        assert!(!worker.controls_clients());
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let network = FakeNetwork::online();
        network.route("https://cards.test/", Response::new(200, "root"));
        // index.html and manifest.json are 404
        let worker = OfflineWorker::new(&config(), Arc::new(CacheStorage::new()), network).unwrap();

        let err = worker.install().await.unwrap_err();
        assert!(matches!(err, CacheError::Install { .. }));
        assert_eq!(worker.state(), WorkerState::Redundant);
        assert!(!worker.caches().has("static-v2"));
    }

    #[tokio::test]
    async fn test_failed_install_keeps_earlier_entries() {
        let caches = Arc::new(CacheStorage::new());
        caches.put("static-v2", "https://cards.test/", Response::new(200, "earlier root"));

        let network = FakeNetwork::online();
        network.route("https://cards.test/", Response::new(200, "new root"));
        let worker = OfflineWorker::new(&config(), caches.clone(), network).unwrap();

        assert!(worker.install().await.is_err());
        assert_eq!(worker.state(), WorkerState::Redundant);
        let kept = caches.match_in("static-v2", "https://cards.test/").unwrap();
        assert_eq!(&kept.body[..], b"earlier root");
        assert_eq!(caches.keys("static-v2"), vec!["https://cards.test/".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_partitions() {
        let caches = Arc::new(CacheStorage::new());
        caches.put("static-v1", "https://cards.test/", Response::new(200, "old"));
        caches.put("dynamic-v1", "https://cards.test/app.js", Response::new(200, "old"));
        caches.put("dynamic-v2", "https://cards.test/app.js", Response::new(200, "new"));

        let worker = OfflineWorker::new(&config(), caches, network_with_shell()).unwrap();
        assert!(matches!(
            worker.activate().await,
            Err(CacheError::InvalidState { .. })
        ));

        worker.install().await.unwrap();
        let mut deleted = worker.activate().await.unwrap();
        deleted.sort();

        assert_eq!(deleted, vec!["dynamic-v1".to_string(), "static-v1".to_string()]);
        assert_eq!(worker.state(), WorkerState::Activated);
        assert!(worker.controls_clients());
        assert!(worker.caches().has("dynamic-v2"));
    }

    #[tokio::test]
    async fn test_offline_document_served_from_static_cache() {
        let network = network_with_shell();
        let worker = active_worker(network.clone()).await;

        network.go_offline();
        let response = worker.handle_fetch(&Request::navigate("/index.html")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<html>shell</html>");
    }

    #[tokio::test]
    async fn test_offline_unknown_page_falls_back_to_shell() {
        let network = network_with_shell();
        let worker = active_worker(network.clone()).await;

        network.go_offline();
        let response = worker.handle_fetch(&Request::navigate("/study/high1")).await;
        assert_eq!(response.body, "<html>shell</html>");
    }

    #[tokio::test]
    async fn test_network_first_updates_dynamic_cache() {
        let network = network_with_shell();
        network.route("https://cards.test/important", Response::new(200, "v1"));
        let worker = active_worker(network.clone()).await;

        let response = worker.handle_fetch(&Request::navigate("/important")).await;
        assert_eq!(response.body, "v1");
        assert!(worker
            .caches()
            .match_in("dynamic-v2", "https://cards.test/important")
            .is_some());

        // Online responses win over the cache
        network.route("https://cards.test/important", Response::new(200, "v2"));
        let response = worker.handle_fetch(&Request::navigate("/important")).await;
        assert_eq!(response.body, "v2");
    }

    #[tokio::test]
    async fn test_cache_first_skips_network_on_hit() {
        let network = network_with_shell();
        network.route("https://cards.test/app.js", Response::new(200, "console.log(1)"));
        let worker = active_worker(network.clone()).await;

        let first = worker.handle_fetch(&Request::get("/app.js")).await;
        let calls = network.calls();
        let second = worker.handle_fetch(&Request::get("/app.js")).await;

        assert_eq!(first, second);
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_failed_responses_are_not_cached() {
        let network = network_with_shell();
        network.route("https://cards.test/broken.css", Response::new(500, "oops"));
        let worker = active_worker(network.clone()).await;

        let response = worker.handle_fetch(&Request::get("/broken.css")).await;
        assert_eq!(response.status, 500);
        assert!(worker
            .caches()
            .match_any("https://cards.test/broken.css")
            .is_none());

        let missing = worker.handle_fetch(&Request::navigate("/missing")).await;
        assert_eq!(missing.status, 404);
        assert!(worker.caches().match_any("https://cards.test/missing").is_none());
    }

    #[tokio::test]
    async fn test_offline_without_cache_is_503() {
        let network = network_with_shell();
        let worker = active_worker(network.clone()).await;
        network.go_offline();

        let image = worker.handle_fetch(&Request::get("/icons/new.png")).await;
        assert_eq!(image, Response::offline());

        let api = worker.handle_fetch(&Request::get("/api/voices")).await;
        assert_eq!(api.status, 503);
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let network = network_with_shell();
        network.route("https://cards.test/sync", Response::new(200, "ok"));
        let worker = active_worker(network.clone()).await;

        let response = worker
            .handle_fetch(&Request::get("/sync").with_method("POST"))
            .await;
        assert_eq!(response.status, 200);
        assert!(worker.caches().match_any("https://cards.test/sync").is_none());
    }

    #[tokio::test]
    async fn test_inactive_worker_passes_through() {
        let network = network_with_shell();
        network.route("https://cards.test/app.js", Response::new(200, "js"));
        let worker =
            OfflineWorker::new(&config(), Arc::new(CacheStorage::new()), network).unwrap();

        let response = worker.handle_fetch(&Request::get("/app.js")).await;
        assert_eq!(response.body, "js");
        assert!(worker.caches().names().is_empty());
    }

    #[test]
    fn test_cache_key_resolves_and_drops_fragment() {
        let worker = OfflineWorker::new(
            &config(),
            Arc::new(CacheStorage::new()),
            FakeNetwork::online(),
        )
        .unwrap();
        assert_eq!(worker.cache_key("/a.js#x"), "https://cards.test/a.js");
        assert_eq!(
            worker.cache_key("https://cdn.test/b.css?v=1"),
            "https://cdn.test/b.css?v=1"
        );
    }
}
