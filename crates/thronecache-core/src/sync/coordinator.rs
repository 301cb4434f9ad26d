//! Cache-aside coordinator between the remote catalog and the local store.
//!
//! Consumers only see the store's feed. A page load fetches only when the
//! store is completely empty; it does not track which page the cached rows
//! came from. A refresh always refetches and replaces.
//!
//! Requests are not queued, deduplicated or cancelled. Overlapping requests
//! race at the store, and whichever write commits last is what subscribers
//! end up with.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::RemoteSource;
use crate::models::{Character, PageNumber};
use crate::store::{CachedData, CharacterFeed, CharacterStore, Snapshot, StoreError};

use super::{LoadOutcome, LoadState, RefreshStrategy, SyncError, SyncRequest};

/// Requests that have gone past the cache check, and the state published
/// for them. `Idle` is only published once none are left.
struct LoadTracker {
    in_flight: Mutex<Vec<SyncRequest>>,
    state: watch::Sender<LoadState>,
}

impl LoadTracker {
    fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            in_flight: Mutex::new(Vec::new()),
            state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SyncRequest>> {
        // The list is only pushed to and removed from; a poisoned one is still usable
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, request: SyncRequest) {
        let mut in_flight = self.lock();
        in_flight.push(request);
        self.publish(LoadState::Loading { request });
    }

    fn finish(&self, request: SyncRequest, finished: LoadState) {
        let mut in_flight = self.lock();
        if let Some(pos) = in_flight.iter().position(|r| *r == request) {
            in_flight.remove(pos);
        }
        self.publish(finished);

        let next = match in_flight.last() {
            Some(&request) => LoadState::Loading { request },
            None => LoadState::Idle,
        };
        self.publish(next);
    }

    fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn publish(&self, next: LoadState) {
        debug!(state = ?next, "Load state");
        self.state.send_replace(next);
    }
}

/// Orchestrates fetches and store writes. Clone is cheap; clones share
/// the same store, remote and load state.
#[derive(Clone)]
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteSource>,
    store: Arc<CharacterStore>,
    strategy: RefreshStrategy,
    loads: Arc<LoadTracker>,
}

impl SyncCoordinator {
    pub fn new(remote: Arc<dyn RemoteSource>, store: Arc<CharacterStore>) -> Self {
        Self {
            remote,
            store,
            strategy: RefreshStrategy::default(),
            loads: Arc::new(LoadTracker::new()),
        }
    }

    pub fn with_strategy(mut self, strategy: RefreshStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> RefreshStrategy {
        self.strategy
    }

    // ===== Consumer-facing =====

    /// The character feed. Emits the current table, then every change.
    pub fn subscribe(&self) -> Result<CharacterFeed, SyncError> {
        Ok(self.store.observe_all()?)
    }

    /// What a new subscriber would receive first.
    pub fn snapshot(&self) -> Result<Snapshot, SyncError> {
        Ok(self.store.snapshot()?)
    }

    /// Row count and last write time of the cache, if it was ever written.
    pub fn freshness(&self) -> Result<Option<CachedData<usize>>, SyncError> {
        Ok(self.store.freshness()?)
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.store.path()
    }

    /// Empty the cache. Subscribers receive the empty table.
    pub async fn clear(&self) -> Result<(), SyncError> {
        self.with_store(|store| store.clear()).await?;
        info!("Character cache cleared");
        Ok(())
    }

    pub fn load_state(&self) -> LoadState {
        self.loads.state.borrow().clone()
    }

    pub fn watch_load_state(&self) -> watch::Receiver<LoadState> {
        self.loads.state.subscribe()
    }

    /// Number of requests currently fetching or writing.
    pub fn in_flight(&self) -> usize {
        self.loads.in_flight()
    }

    /// Load a page unless anything at all is already cached.
    pub async fn request_page(&self, page: PageNumber) -> Result<LoadOutcome, SyncError> {
        self.request(SyncRequest::Page(page)).await
    }

    /// Refetch a page and replace whatever is cached.
    pub async fn request_refresh(&self, page: PageNumber) -> Result<LoadOutcome, SyncError> {
        self.request(SyncRequest::Refresh(page)).await
    }

    pub async fn request(&self, request: SyncRequest) -> Result<LoadOutcome, SyncError> {
        let result = match request {
            SyncRequest::Page(page) => self.load_page(request, page).await,
            SyncRequest::Refresh(page) => self.refresh_page(request, page).await,
        };

        if let Ok(LoadOutcome::CacheHit { cached }) = result {
            debug!(%request, cached, "Served from cache");
            return result;
        }

        let finished = match &result {
            Ok(outcome) => LoadState::Success {
                request,
                outcome: *outcome,
            },
            Err(e) => {
                warn!(%request, error = %e, "Sync request failed");
                LoadState::Failed {
                    request,
                    message: e.to_string(),
                }
            }
        };
        self.loads.finish(request, finished);
        result
    }

    /// Run a request on the runtime without waiting for it.
    pub fn spawn(&self, request: SyncRequest) -> JoinHandle<Result<LoadOutcome, SyncError>> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.request(request).await })
    }

    // ===== Policy =====

    async fn load_page(
        &self,
        request: SyncRequest,
        page: PageNumber,
    ) -> Result<LoadOutcome, SyncError> {
        let cached = self.with_store(|store| store.len()).await?;
        if cached > 0 {
            return Ok(LoadOutcome::CacheHit { cached });
        }

        self.loads.begin(request);
        let characters = self.fetch(page).await?;
        let inserted = self.insert(characters).await?;
        Ok(LoadOutcome::Fetched { page, inserted })
    }

    async fn refresh_page(
        &self,
        request: SyncRequest,
        page: PageNumber,
    ) -> Result<LoadOutcome, SyncError> {
        self.loads.begin(request);

        let inserted = match self.strategy {
            RefreshStrategy::ClearFirst => {
                self.with_store(|store| store.clear()).await?;
                let characters = self.fetch(page).await?;
                self.insert(characters).await?
            }
            RefreshStrategy::SwapOnSuccess => {
                let characters = self.fetch(page).await?;
                let count = characters.len();
                self.with_store(move |store| store.replace_all(characters))
                    .await?;
                count
            }
        };

        info!(page = page.get(), inserted, strategy = ?self.strategy, "Refresh complete");
        Ok(LoadOutcome::Fetched { page, inserted })
    }

    async fn fetch(&self, page: PageNumber) -> Result<Vec<Character>, SyncError> {
        info!(page = page.get(), "Fetching character page");
        let characters = self.remote.fetch_page(page).await?;
        debug!(page = page.get(), count = characters.len(), "Fetched character page");
        Ok(characters)
    }

    async fn insert(&self, characters: Vec<Character>) -> Result<usize, SyncError> {
        let ids = self
            .with_store(move |store| store.insert_all(characters))
            .await?;
        Ok(ids.len())
    }

    /// Run a store operation on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&CharacterStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store)).await?
    }
}

// ============================================================================
// Tests
// ============================================================================
