//! Cache-aside synchronization.
//!
//! `SyncCoordinator` decides between the local store and the remote source
//! and is the only thing consumers talk to.

pub mod coordinator;
pub mod error;
pub mod state;

pub use coordinator::SyncCoordinator;
pub use error::SyncError;
pub use state::{LoadOutcome, LoadState, RefreshStrategy, SyncRequest};
