//! Remote catalog access.
//!
//! `RemoteSource` is the seam the sync layer fetches through; `ApiClient`
//! is the HTTP implementation against the Ice and Fire API.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{Character, PageNumber};

pub use client::ApiClient;
pub use error::ApiError;

/// One page of character records from somewhere remote.
///
/// Implementations make a single best-effort attempt per call.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_page(&self, page: PageNumber) -> Result<Vec<Character>, ApiError>;
}
