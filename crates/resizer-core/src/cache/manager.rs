//! Lifecycle and request routing for one cache generation.

use std::cell::Cell;

use tracing::{debug, info, warn};
use url::{Origin, Url};

use super::generation::{CacheConfig, CacheGeneration, SKIP_WAITING};
use super::store::{CacheHandle, CacheStorage, Network};
use super::types::{
    cache_key, AssetRequest, AssetResponse, CacheError, Destination, LifecycleState, Strategy,
};

/// A successful network response not yet written to the cache.
///
/// Routing returns the response first; the host commits the copy afterwards
/// (in a browser, via `waitUntil`) so the page is not kept waiting.
#[derive(Debug)]
pub struct PendingWrite<H> {
    handle: H,
    key: String,
    response: AssetResponse,
}

impl<H: CacheHandle> PendingWrite<H> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store the copy. Failures are logged; the response was already served.
    pub async fn commit(self) {
        if let Err(e) = self.handle.put(&self.key, &self.response).await {
            warn!(key = %self.key, error = %e, "cache write-back failed");
        }
    }
}

#[derive(Debug)]
pub enum Routed<H> {
    /// Not ours; let the request through untouched.
    Passthrough,
    Respond {
        response: AssetResponse,
        write_back: Option<PendingWrite<H>>,
    },
}

impl<H> Routed<H> {
    pub fn response(&self) -> Option<&AssetResponse> {
        match self {
            Routed::Passthrough => None,
            Routed::Respond { response, .. } => Some(response),
        }
    }
}

/// Installs, promotes and serves one versioned generation of the app shell.
///
/// The hosting runtime sequences lifecycle calls; this type only refuses
/// calls that arrive in the wrong state.
pub struct AssetCacheManager<S, N> {
    prefix: String,
    generation: CacheGeneration,
    skip_waiting_on_install: bool,
    base: Url,
    origin: Origin,
    storage: S,
    network: N,
    state: Cell<LifecycleState>,
    skip_waiting: Cell<bool>,
    controls_clients: Cell<bool>,
}

impl<S: CacheStorage, N: Network> AssetCacheManager<S, N> {
    /// # Errors
    ///
    /// `CacheError::InvalidUrl` when `origin` does not parse.
    pub fn new(
        config: &CacheConfig,
        origin: &str,
        storage: S,
        network: N,
    ) -> Result<Self, CacheError> {
        let base =
            Url::parse(origin).map_err(|e| CacheError::InvalidUrl(format!("{origin}: {e}")))?;
        Ok(Self {
            prefix: config.prefix.clone(),
            generation: config.generation(),
            skip_waiting_on_install: config.skip_waiting_on_install,
            origin: base.origin(),
            base,
            storage,
            network,
            state: Cell::new(LifecycleState::Parsed),
            skip_waiting: Cell::new(false),
            controls_clients: Cell::new(false),
        })
    }

    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Set once activation has claimed the open pages.
    pub fn controls_clients(&self) -> bool {
        self.controls_clients.get()
    }

    fn expect_state(
        &self,
        expected: LifecycleState,
        action: &'static str,
    ) -> Result<(), CacheError> {
        let state = self.state.get();
        if state == expected {
            Ok(())
        } else {
            Err(CacheError::InvalidState { action, state })
        }
    }

    /// Fetch every manifest asset and store them in this generation's cache.
    ///
    /// All or nothing: on any failure a cache this call created is deleted
    /// and the generation is marked failed. A cache that already existed
    /// under the same name (a reinstall of the live version) is left alone.
    ///
    /// # Errors
    ///
    /// `CacheError::InstallFailed` naming the asset that could not be stored.
    pub async fn install(&self) -> Result<(), CacheError> {
        self.expect_state(LifecycleState::Parsed, "install")?;
        self.state.set(LifecycleState::Installing);

        let mut created = false;
        match self.populate(&mut created).await {
            Ok(count) => {
                self.state.set(LifecycleState::Installed);
                if self.skip_waiting_on_install {
                    self.skip_waiting.set(true);
                }
                info!(cache = %self.generation.name, assets = count, "cache generation installed");
                Ok(())
            }
            Err(e) => {
                if created {
                    if let Err(cleanup) = self.storage.delete(&self.generation.name).await {
                        warn!(
                            cache = %self.generation.name,
                            error = %cleanup,
                            "could not remove partial cache"
                        );
                    }
                }
                self.state.set(LifecycleState::Failed);
                warn!(cache = %self.generation.name, error = %e, "cache installation failed");
                Err(e)
            }
        }
    }

    /// Requests for every manifest path, resolved against the origin.
    fn manifest_requests(&self) -> Result<Vec<AssetRequest>, CacheError> {
        self.generation
            .manifest
            .iter()
            .map(|path| {
                let url = self.base.join(path).map_err(|e| CacheError::InstallFailed {
                    url: path.clone(),
                    reason: e.to_string(),
                })?;
                Ok(AssetRequest {
                    url,
                    method: "GET".to_string(),
                    destination: Destination::Other,
                })
            })
            .collect()
    }

    async fn cache_exists(&self) -> bool {
        match self.storage.keys().await {
            Ok(names) => names.contains(&self.generation.name),
            // Unknown counts as existing so a failure never deletes it.
            Err(_) => true,
        }
    }

    async fn populate(&self, created: &mut bool) -> Result<usize, CacheError> {
        let requests = self.manifest_requests()?;
        let mut fetched = Vec::with_capacity(requests.len());
        for request in &requests {
            let key = request.cache_key();
            let response = self
                .network
                .fetch(request)
                .await
                .map_err(|e| CacheError::InstallFailed {
                    url: key.clone(),
                    reason: e.to_string(),
                })?;
            if !response.is_success() {
                return Err(CacheError::InstallFailed {
                    url: key,
                    reason: format!("HTTP {}", response.status),
                });
            }
            fetched.push((key, response));
        }

        *created = !self.cache_exists().await;
        let handle = self.storage.open(&self.generation.name).await.map_err(|e| {
            CacheError::InstallFailed {
                url: self.generation.name.clone(),
                reason: e.to_string(),
            }
        })?;
        for (key, response) in &fetched {
            handle
                .put(key, response)
                .await
                .map_err(|e| CacheError::InstallFailed {
                    url: key.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(fetched.len())
    }

    /// Promote as soon as installation completes, without waiting for old
    /// pages to close.
    pub fn skip_waiting(&self) {
        self.skip_waiting.set(true);
    }

    /// Handle a message posted by a page. Returns whether it was understood.
    pub fn handle_message(&self, message: &str) -> bool {
        if message == SKIP_WAITING {
            debug!(cache = %self.generation.name, "skip-waiting requested");
            self.skip_waiting();
            true
        } else {
            false
        }
    }

    /// Whether promotion may proceed given whether pages controlled by an
    /// older generation are still open.
    pub fn ready_to_activate(&self, older_clients_open: bool) -> bool {
        self.state.get() == LifecycleState::Installed
            && (self.skip_waiting.get() || !older_clients_open)
    }

    /// Make this generation current: delete every other generation under the
    /// same prefix and take control of open pages.
    ///
    /// Sweeping is best-effort; a cache that cannot be listed or deleted is
    /// logged and left for the next activation.
    ///
    /// Returns the names of the deleted caches.
    ///
    /// # Errors
    ///
    /// `CacheError::InvalidState` unless installation has completed.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        self.expect_state(LifecycleState::Installed, "activate")?;
        self.state.set(LifecycleState::Activating);

        let mut deleted = Vec::new();
        match self.storage.keys().await {
            Ok(names) => {
                for name in names {
                    if !self.generation.is_stale(&self.prefix, &name) {
                        continue;
                    }
                    match self.storage.delete(&name).await {
                        Ok(_) => deleted.push(name),
                        Err(e) => {
                            warn!(cache = %name, error = %e, "could not delete stale cache")
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not list caches; skipping sweep"),
        }

        self.state.set(LifecycleState::Active);
        self.controls_clients.set(true);
        info!(cache = %self.generation.name, swept = deleted.len(), "cache generation active");
        Ok(deleted)
    }

    /// Re-enter service for a generation promoted in an earlier run of the
    /// host (a restarted worker), without installing or sweeping again.
    ///
    /// # Errors
    ///
    /// `CacheError::InvalidState` if any lifecycle step already ran here.
    pub fn resume(&self) -> Result<(), CacheError> {
        self.expect_state(LifecycleState::Parsed, "resume")?;
        self.state.set(LifecycleState::Active);
        self.controls_clients.set(true);
        debug!(cache = %self.generation.name, "resumed active generation");
        Ok(())
    }

    /// Re-enter the waiting state for a generation installed in an earlier
    /// run of the host, so a restarted worker can still be activated.
    ///
    /// Every manifest asset must already be in this generation's cache.
    ///
    /// # Errors
    ///
    /// `CacheError::InvalidState` if any lifecycle step already ran here, and
    /// `CacheError::Miss` naming the first asset missing from the cache. The
    /// state stays `Parsed` on error, so a fresh install may follow.
    pub async fn resume_installed(&self) -> Result<(), CacheError> {
        self.expect_state(LifecycleState::Parsed, "resume installed")?;

        let requests = self.manifest_requests()?;
        let first = requests.first().map(AssetRequest::cache_key).unwrap_or_default();
        if !self.cache_exists().await {
            return Err(CacheError::Miss { url: first });
        }
        let handle = self.storage.open(&self.generation.name).await?;
        for request in &requests {
            let key = request.cache_key();
            if handle.lookup(&key).await?.is_none() {
                return Err(CacheError::Miss { url: key });
            }
        }

        self.state.set(LifecycleState::Installed);
        if self.skip_waiting_on_install {
            self.skip_waiting.set(true);
        }
        debug!(cache = %self.generation.name, "resumed installed generation");
        Ok(())
    }

    /// Called when a newer generation takes over.
    pub fn supersede(&self) {
        self.state.set(LifecycleState::Superseded);
        self.controls_clients.set(false);
    }

    /// Whether [`route`](Self::route) would answer `request` rather than
    /// pass it through. Hosts that must decide synchronously call this first.
    pub fn handles(&self, request: &AssetRequest) -> bool {
        request.url.origin() == self.origin
            && request.is_get()
            && self.state.get() == LifecycleState::Active
    }

    /// Answer a request from the page.
    ///
    /// Cross-origin requests, non-GET requests and requests arriving before
    /// activation pass through. The cache handle is acquired once per call
    /// and stays valid even if a newer activation deletes the cache meanwhile.
    ///
    /// # Errors
    ///
    /// `CacheError::Miss` when neither the network nor the cache can answer.
    pub async fn route(&self, request: &AssetRequest) -> Result<Routed<S::Handle>, CacheError> {
        if !self.handles(request) {
            return Ok(Routed::Passthrough);
        }

        let handle = match self.storage.open(&self.generation.name).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(
                    cache = %self.generation.name,
                    error = %e,
                    "cache unavailable; using network only"
                );
                None
            }
        };
        let key = cache_key(&request.url);

        match request.strategy() {
            Strategy::FreshnessFirst => self.network_first(request, handle, key).await,
            Strategy::AvailabilityFirst => self.cache_first(request, handle, key).await,
        }
    }

    async fn network_first(
        &self,
        request: &AssetRequest,
        handle: Option<S::Handle>,
        key: String,
    ) -> Result<Routed<S::Handle>, CacheError> {
        match self.network.fetch(request).await {
            Ok(response) => {
                let write_back = match handle {
                    Some(handle) if response.is_success() => Some(PendingWrite {
                        handle,
                        key,
                        response: response.clone(),
                    }),
                    _ => None,
                };
                Ok(Routed::Respond {
                    response,
                    write_back,
                })
            }
            Err(e) => {
                debug!(url = %key, error = %e, "network failed; trying cache");
                match lookup(handle.as_ref(), &key).await {
                    Some(response) => Ok(Routed::Respond {
                        response,
                        write_back: None,
                    }),
                    None => Err(CacheError::Miss { url: key }),
                }
            }
        }
    }

    async fn cache_first(
        &self,
        request: &AssetRequest,
        handle: Option<S::Handle>,
        key: String,
    ) -> Result<Routed<S::Handle>, CacheError> {
        if let Some(response) = lookup(handle.as_ref(), &key).await {
            return Ok(Routed::Respond {
                response,
                write_back: None,
            });
        }
        match self.network.fetch(request).await {
            Ok(response) => Ok(Routed::Respond {
                response,
                write_back: None,
            }),
            Err(e) => {
                debug!(url = %key, error = %e, "not cached and network failed");
                Err(CacheError::Miss { url: key })
            }
        }
    }
}

async fn lookup<H: CacheHandle>(handle: Option<&H>, key: &str) -> Option<AssetResponse> {
    let handle = handle?;
    match handle.lookup(key).await {
        Ok(found) => found,
        Err(e) => {
            warn!(url = %key, error = %e, "cache lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::{MemoryCache, MemoryCacheStorage};
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    const ORIGIN: &str = "https://example.org";

    /// Serves `body-of:{path}` for every URL unless told otherwise.
    #[derive(Clone, Default)]
    struct FakeNetwork {
        offline: Rc<Cell<bool>>,
        broken: Rc<RefCell<HashSet<String>>>,
        statuses: Rc<RefCell<HashMap<String, u16>>>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl FakeNetwork {
        fn break_path(&self, path: &str) {
            self.broken.borrow_mut().insert(path.to_string());
        }
    }

    impl Network for FakeNetwork {
        async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, CacheError> {
            let path = request.url.path().to_string();
            self.calls.borrow_mut().push(path.clone());
            if self.offline.get() || self.broken.borrow().contains(&path) {
                return Err(CacheError::Network(format!("unreachable: {path}")));
            }
            let status = self.statuses.borrow().get(&path).copied().unwrap_or(200);
            Ok(AssetResponse {
                status,
                headers: Vec::new(),
                body: format!("body-of:{path}").into_bytes(),
            })
        }
    }

    fn manager(
        version: u32,
        storage: &MemoryCacheStorage,
        network: &FakeNetwork,
    ) -> AssetCacheManager<MemoryCacheStorage, FakeNetwork> {
        let config = CacheConfig {
            version,
            ..Default::default()
        };
        AssetCacheManager::new(&config, ORIGIN, storage.clone(), network.clone()).unwrap()
    }

    async fn active(
        version: u32,
        storage: &MemoryCacheStorage,
        network: &FakeNetwork,
    ) -> AssetCacheManager<MemoryCacheStorage, FakeNetwork> {
        let m = manager(version, storage, network);
        m.install().await.unwrap();
        m.activate().await.unwrap();
        m
    }

    fn get(path: &str, destination: Destination) -> AssetRequest {
        AssetRequest::get(&format!("{ORIGIN}{path}"), destination).unwrap()
    }

    fn body(routed: &Routed<MemoryCache>) -> String {
        String::from_utf8(routed.response().unwrap().body.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_install_stores_whole_manifest() {
        let storage = MemoryCacheStorage::new();
        let m = manager(1, &storage, &FakeNetwork::default());
        m.install().await.unwrap();

        assert_eq!(m.state(), LifecycleState::Installed);
        let cache = storage.get("image-resizer-v1").unwrap();
        assert_eq!(cache.len(), m.generation().manifest.len());
        assert!(cache.contains("https://example.org/image-resizer/icon-512.png"));
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let v2 = active(2, &storage, &network).await;

        network.break_path("/image-resizer/icon-192.png");
        let v3 = manager(3, &storage, &network);
        let err = v3.install().await.unwrap_err();

        assert!(matches!(
            err,
            CacheError::InstallFailed { ref url, .. } if url.ends_with("icon-192.png")
        ));
        assert_eq!(v3.state(), LifecycleState::Failed);
        assert_eq!(storage.names(), vec!["image-resizer-v2".to_string()]);
        assert_eq!(v2.state(), LifecycleState::Active);
        assert!(matches!(
            v3.activate().await,
            Err(CacheError::InvalidState { state: LifecycleState::Failed, .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_reinstall_keeps_live_cache() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let live = active(1, &storage, &network).await;

        network.break_path("/image-resizer/icon-512.png");
        let again = manager(1, &storage, &network);
        assert!(matches!(again.install().await, Err(CacheError::InstallFailed { .. })));
        assert_eq!(again.state(), LifecycleState::Failed);

        assert_eq!(storage.names(), vec!["image-resizer-v1".to_string()]);
        let cache = storage.get("image-resizer-v1").unwrap();
        assert_eq!(cache.len(), live.generation().manifest.len());
        network.offline.set(true);
        let routed = live
            .route(&get("/image-resizer/icon-512.png", Destination::Image))
            .await
            .unwrap();
        assert_eq!(body(&routed), "body-of:/image-resizer/icon-512.png");
    }

    #[tokio::test]
    async fn test_http_error_fails_install() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        network
            .statuses
            .borrow_mut()
            .insert("/image-resizer/app.js".to_string(), 404);
        let m = manager(1, &storage, &network);
        assert!(matches!(m.install().await, Err(CacheError::InstallFailed { .. })));
        assert!(storage.names().is_empty());
    }

    #[tokio::test]
    async fn test_activation_sweeps_only_owned_generations() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let v2 = active(2, &storage, &network).await;
        storage.open("other-app-v1").await.unwrap();
        storage.open("image-resizer-v1").await.unwrap();

        let v3 = manager(3, &storage, &network);
        v3.install().await.unwrap();
        let deleted = v3.activate().await.unwrap();
        v2.supersede();

        let mut deleted = deleted;
        deleted.sort();
        assert_eq!(
            deleted,
            vec!["image-resizer-v1".to_string(), "image-resizer-v2".to_string()]
        );
        assert_eq!(
            storage.names(),
            vec!["image-resizer-v3".to_string(), "other-app-v1".to_string()]
        );
        assert!(v3.controls_clients());
        assert!(!v2.controls_clients());
        assert_eq!(v2.state(), LifecycleState::Superseded);
    }

    #[tokio::test]
    async fn test_waiting_until_released() {
        let storage = MemoryCacheStorage::new();
        let config = CacheConfig {
            skip_waiting_on_install: false,
            ..Default::default()
        };
        let m = AssetCacheManager::new(&config, ORIGIN, storage, FakeNetwork::default()).unwrap();
        assert!(!m.ready_to_activate(false));
        m.install().await.unwrap();

        assert!(m.ready_to_activate(false));
        assert!(!m.ready_to_activate(true));
        assert!(!m.handle_message("hello"));
        assert!(m.handle_message(SKIP_WAITING));
        assert!(m.ready_to_activate(true));
    }

    #[tokio::test]
    async fn test_skip_waiting_on_install_by_default() {
        let m = manager(1, &MemoryCacheStorage::new(), &FakeNetwork::default());
        m.install().await.unwrap();
        assert!(m.ready_to_activate(true));
    }

    #[tokio::test]
    async fn test_install_twice_refused() {
        let m = manager(1, &MemoryCacheStorage::new(), &FakeNetwork::default());
        m.install().await.unwrap();
        assert!(matches!(m.install().await, Err(CacheError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_freshness_first_prefers_network_and_writes_back() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let m = active(1, &storage, &network).await;

        let request = get("/image-resizer/extra.js", Destination::Script);
        let routed = m.route(&request).await.unwrap();
        assert_eq!(body(&routed), "body-of:/image-resizer/extra.js");

        let cache = storage.get("image-resizer-v1").unwrap();
        let key = "https://example.org/image-resizer/extra.js";
        assert!(!cache.contains(key));
        match routed {
            Routed::Respond {
                write_back: Some(pending),
                ..
            } => {
                assert_eq!(pending.key(), key);
                pending.commit().await;
            }
            other => panic!("expected a pending write, got {other:?}"),
        }
        assert!(cache.contains(key));
    }

    #[tokio::test]
    async fn test_freshness_first_falls_back_to_cache() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let m = active(1, &storage, &network).await;

        network.offline.set(true);
        let routed = m
            .route(&get("/image-resizer/index.html", Destination::Document))
            .await
            .unwrap();
        assert_eq!(body(&routed), "body-of:/image-resizer/index.html");
    }

    #[tokio::test]
    async fn test_offline_and_uncached_is_miss() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let m = active(1, &storage, &network).await;

        network.offline.set(true);
        let err = m
            .route(&get("/image-resizer/new.css", Destination::Style))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Miss { .. }));
        let err = m
            .route(&get("/image-resizer/new.png", Destination::Image))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Miss { .. }));
    }

    #[tokio::test]
    async fn test_error_responses_not_written_back() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let m = active(1, &storage, &network).await;
        network
            .statuses
            .borrow_mut()
            .insert("/image-resizer/gone.js".to_string(), 500);

        let routed = m
            .route(&get("/image-resizer/gone.js", Destination::Script))
            .await
            .unwrap();
        assert!(matches!(routed, Routed::Respond { write_back: None, .. }));
        assert_eq!(routed.response().unwrap().status, 500);
    }

    #[tokio::test]
    async fn test_availability_first_skips_network_when_cached() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let m = active(1, &storage, &network).await;
        network.calls.borrow_mut().clear();

        let routed = m
            .route(&get("/image-resizer/icon-192.png", Destination::Image))
            .await
            .unwrap();
        assert_eq!(body(&routed), "body-of:/image-resizer/icon-192.png");
        assert!(network.calls.borrow().is_empty());

        m.route(&get("/image-resizer/photo.png", Destination::Image))
            .await
            .unwrap();
        assert_eq!(*network.calls.borrow(), vec!["/image-resizer/photo.png".to_string()]);
    }

    #[tokio::test]
    async fn test_passthrough_cases() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let installed = manager(1, &storage, &network);
        installed.install().await.unwrap();
        let early = installed
            .route(&get("/image-resizer/index.html", Destination::Document))
            .await
            .unwrap();
        assert!(matches!(early, Routed::Passthrough));

        installed.activate().await.unwrap();
        assert!(installed.handles(&get("/image-resizer/index.html", Destination::Document)));
        let foreign =
            AssetRequest::get("https://cdn.example.com/lib.js", Destination::Script).unwrap();
        assert!(matches!(installed.route(&foreign).await.unwrap(), Routed::Passthrough));
        let post = AssetRequest::new(
            &format!("{ORIGIN}/image-resizer/upload"),
            "POST",
            Destination::Other,
        )
        .unwrap();
        assert!(matches!(installed.route(&post).await.unwrap(), Routed::Passthrough));
    }

    #[tokio::test]
    async fn test_superseded_generation_passes_through() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let m = active(1, &storage, &network).await;
        m.supersede();
        let routed = m
            .route(&get("/image-resizer/", Destination::Document))
            .await
            .unwrap();
        assert!(matches!(routed, Routed::Passthrough));
    }

    #[tokio::test]
    async fn test_resumed_generation_serves_from_existing_cache() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        active(1, &storage, &network).await;

        let restarted = manager(1, &storage, &network);
        restarted.resume().unwrap();
        assert_eq!(restarted.state(), LifecycleState::Active);
        network.offline.set(true);
        let routed = restarted
            .route(&get("/image-resizer/style.css", Destination::Style))
            .await
            .unwrap();
        assert_eq!(body(&routed), "body-of:/image-resizer/style.css");
        assert!(matches!(restarted.resume(), Err(CacheError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_restarted_waiting_worker_can_activate() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();
        let config = CacheConfig {
            version: 2,
            skip_waiting_on_install: false,
            ..Default::default()
        };
        let v1 = active(1, &storage, &network).await;
        let waiting =
            AssetCacheManager::new(&config, ORIGIN, storage.clone(), network.clone()).unwrap();
        waiting.install().await.unwrap();
        drop(waiting);

        let restarted =
            AssetCacheManager::new(&config, ORIGIN, storage.clone(), network.clone()).unwrap();
        network.offline.set(true);
        restarted.resume_installed().await.unwrap();
        assert_eq!(restarted.state(), LifecycleState::Installed);
        assert!(!restarted.ready_to_activate(true));
        assert!(restarted.ready_to_activate(false));

        let deleted = restarted.activate().await.unwrap();
        v1.supersede();
        assert_eq!(deleted, vec!["image-resizer-v1".to_string()]);
        assert!(restarted.handles(&get("/image-resizer/", Destination::Document)));
        assert!(matches!(
            restarted.resume_installed().await,
            Err(CacheError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_incomplete_cache_cannot_resume_installed() {
        let storage = MemoryCacheStorage::new();
        let network = FakeNetwork::default();

        let fresh = manager(2, &storage, &network);
        assert!(matches!(
            fresh.resume_installed().await,
            Err(CacheError::Miss { .. })
        ));
        assert!(storage.names().is_empty());

        let partial = storage.open("image-resizer-v2").await.unwrap();
        partial
            .put(
                "https://example.org/image-resizer/",
                &AssetResponse::ok("text/html", "shell"),
            )
            .await
            .unwrap();
        let err = fresh.resume_installed().await.unwrap_err();
        assert!(matches!(err, CacheError::Miss { ref url } if url.ends_with("index.html")));
        assert_eq!(fresh.state(), LifecycleState::Parsed);

        fresh.install().await.unwrap();
        assert_eq!(fresh.state(), LifecycleState::Installed);
    }

    #[test]
    fn test_invalid_origin() {
        let result = AssetCacheManager::new(
            &CacheConfig::default(),
            "::nope",
            MemoryCacheStorage::new(),
            FakeNetwork::default(),
        );
        assert!(matches!(result, Err(CacheError::InvalidUrl(_))));
    }
}
