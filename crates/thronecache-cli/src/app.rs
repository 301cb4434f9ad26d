//! Wiring for the command-line consumer.
//!
//! `App` owns the coordinator for the process. The store it opens is only
//! reachable through the coordinator.

use std::sync::Arc;

use anyhow::{Context, Result};
use thronecache_core::{ApiClient, CharacterStore, Config, SyncCoordinator};
use tracing::debug;

pub struct App {
    pub config: Config,
    pub sync: SyncCoordinator,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, "Cache directory configured");

        let store = Arc::new(
            CharacterStore::open_in(&cache_dir).context("Failed to open character cache")?,
        );
        let api = ApiClient::from_config(&config).context("Failed to create API client")?;
        debug!(base_url = api.base_url(), "API client configured");

        let sync =
            SyncCoordinator::new(Arc::new(api), store).with_strategy(config.refresh_strategy);

        Ok(Self { config, sync })
    }
}
