//! PokéAPI client
//!
//! This module provides functionality to fetch the Pokémon index and
//! per-Pokémon details from PokéAPI and parse them into our data structures.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{PokemonDetailData, PokemonListing};

/// Base URL for the PokéAPI v2 REST API
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Number of Pokémon requested for the index page
pub const DEFAULT_LIST_LIMIT: u32 = 9;

/// Errors that can occur when fetching from PokéAPI
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for fetching Pokémon data from PokéAPI
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    /// API root without trailing slash (allows override for testing)
    base_url: String,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PokeApiClient {
    /// Create a new PokeApiClient against the public API
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new PokeApiClient against a custom API root
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Returns the API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the first `limit` entries of the Pokémon index
    ///
    /// # Returns
    /// * `Ok(PokemonListing)` - Count and ordered results
    /// * `Err(ApiError)` - If the request, status check, or parsing fails
    pub async fn fetch_listing(&self, limit: u32) -> Result<PokemonListing, ApiError> {
        let url = format!("{}/pokemon?limit={}", self.base_url, limit);
        self.get_json(&url).await
    }

    /// Fetch details for a single Pokémon by name
    pub async fn fetch_detail(&self, name: &str) -> Result<PokemonDetailData, ApiError> {
        let url = format!("{}/pokemon/{}/", self.base_url, name);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
