//! thronecache core library.
//!
//! Fetches pages of characters from the Ice and Fire catalog, keeps them in
//! a local store, and serves every consumer one live feed of the cached
//! table. The network is only consulted when the cache is empty or a
//! refresh is asked for.
//!
//! - `api`: `RemoteSource` trait and the HTTP `ApiClient`
//! - `store`: `CharacterStore`, its change feed and on-disk format
//! - `sync`: `SyncCoordinator`, the cache-aside policy
//! - `config`: JSON configuration
//! - `export`: plain-text export and backup

pub mod api;
pub mod config;
pub mod export;
pub mod models;
pub mod store;
pub mod sync;

pub use api::{ApiClient, ApiError, RemoteSource};
pub use config::Config;
pub use models::{Character, CharacterId, InvalidPage, PageNumber};
pub use store::{CachedData, CharacterFeed, CharacterStore, Snapshot, StoreError};
pub use sync::{LoadOutcome, LoadState, RefreshStrategy, SyncCoordinator, SyncError, SyncRequest};
