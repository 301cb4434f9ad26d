//! HTTP client for the Ice and Fire catalog API.
//!
//! Fetches one page of `/characters` per call. There is no retry and no
//! caching here; both belong to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Character, PageNumber};

use super::{ApiError, RemoteSource};

// ============================================================================
// Constants
// ============================================================================

/// Public catalog endpoint, used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://anapioficeandfire.com/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Records per page requested from the catalog (the API's own default).
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// API client for the character catalog.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl ApiClient {
    /// Create a client against the public catalog with default settings
    pub fn new() -> Result<Self, ApiError> {
        Self::with_options(
            DEFAULT_API_BASE_URL,
            DEFAULT_PAGE_SIZE,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Create a client from application configuration
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::with_options(
            &config.api_base_url(),
            config.page_size(),
            Duration::from_secs(config.request_timeout_secs()),
        )
    }

    pub fn with_options(base_url: &str, page_size: u32, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn characters_url(&self, page: PageNumber) -> String {
        format!(
            "{}/characters?page={}&pageSize={}",
            self.base_url, page, self.page_size
        )
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Decode a page body. Split out so payload handling is testable offline.
    pub fn parse_page(body: &str) -> Result<Vec<Character>, ApiError> {
        let mut characters: Vec<Character> = serde_json::from_str(body)?;
        // The catalog never assigns local ids; drop any that slipped in.
        for character in &mut characters {
            character.id = None;
        }
        Ok(characters)
    }

    /// Fetch a single page of characters
    pub async fn fetch_characters(&self, page: PageNumber) -> Result<Vec<Character>, ApiError> {
        let url = self.characters_url(page);
        debug!(url = %url, "Fetching character page");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Character page request failed");
                ApiError::from(e)
            })?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        let characters = Self::parse_page(&text).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse character page");
            e
        })?;

        debug!(page = page.get(), count = characters.len(), "Character page fetched");
        Ok(characters)
    }
}

#[async_trait]
impl RemoteSource for ApiClient {
    async fn fetch_page(&self, page: PageNumber) -> Result<Vec<Character>, ApiError> {
        self.fetch_characters(page).await
    }
}

// ============================================================================
// Tests
// ============================================================================
