use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::PageNumber;

/// How a forced refresh writes into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStrategy {
    /// Clear the table, then fetch and insert. A failed fetch leaves it empty.
    #[default]
    ClearFirst,
    /// Fetch first and swap the table in one commit. A failed fetch keeps
    /// the previous rows.
    SwapOnSuccess,
}

/// A consumer request to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    Page(PageNumber),
    Refresh(PageNumber),
}

impl SyncRequest {
    pub fn page(&self) -> PageNumber {
        match self {
            SyncRequest::Page(page) | SyncRequest::Refresh(page) => *page,
        }
    }
}

impl fmt::Display for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncRequest::Page(page) => write!(f, "page {}", page),
            SyncRequest::Refresh(page) => write!(f, "refresh {}", page),
        }
    }
}

/// What a successful request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The store already held rows; nothing was fetched.
    CacheHit { cached: usize },
    /// A page was fetched and written.
    Fetched { page: PageNumber, inserted: usize },
}

/// Progress of the most recent request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading { request: SyncRequest },
    Success { request: SyncRequest, outcome: LoadOutcome },
    Failed { request: SyncRequest, message: String },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_strategy_serde_names() {
        let json = serde_json::to_string(&RefreshStrategy::SwapOnSuccess).unwrap();
        assert_eq!(json, "\"swap_on_success\"");
        let parsed: RefreshStrategy = serde_json::from_str("\"clear_first\"").unwrap();
        assert_eq!(parsed, RefreshStrategy::ClearFirst);
    }

    #[test]
    fn test_request_display() {
        let page = PageNumber::new(4).unwrap();
        assert_eq!(SyncRequest::Page(page).to_string(), "page 4");
        assert_eq!(SyncRequest::Refresh(page).to_string(), "refresh 4");
        assert_eq!(SyncRequest::Refresh(page).page(), page);
    }
}
