//! PokeAPI client
//!
//! This module provides functionality to fetch the Pokémon list, detail records
//! and sprite images from PokeAPI. The `PokeApi` trait is the seam the fetch
//! orchestrator depends on; `PokeApiClient` is the reqwest-backed implementation.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{PokemonDetail, PokemonListEntry};

/// Base URL for the PokeAPI
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Errors that can occur when talking to the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body is not the expected JSON
    #[error("Failed to parse API response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Operations the fetch orchestrator needs from the API
#[allow(async_fn_in_trait)]
pub trait PokeApi {
    /// Fetches the full Pokémon list, following pagination links in order
    async fn fetch_list(&self) -> Result<Vec<PokemonListEntry>, ApiError>;

    /// Fetches one detail record
    async fn fetch_detail(&self, url: &str) -> Result<PokemonDetail, ApiError>;

    /// Fetches raw image bytes
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

/// One page of the list endpoint
#[derive(Debug, Deserialize)]
struct ListPage {
    results: Vec<PokemonListEntry>,
    next: Option<String>,
}

/// Client for fetching data from PokeAPI
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API (allows override for testing)
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

    /// Create a new PokeApiClient against a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a new PokeApiClient with a custom HTTP client
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// URL of the first page of the list endpoint
    pub fn list_url(&self) -> String {
        format!("{}/pokemon", self.base_url.trim_end_matches('/'))
    }

    /// Sends a GET request and rejects non-success statuses
    async fn get(&self, url: &str) -> Result<Response, ApiError> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Sends a GET request and parses the body as JSON
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let text = self.get(url).await?.text().await?;
        parse_body(url, &text)
    }
}

impl PokeApi for PokeApiClient {
    async fn fetch_list(&self) -> Result<Vec<PokemonListEntry>, ApiError> {
        let mut entries = Vec::new();
        let mut next = Some(self.list_url());

        while let Some(url) = next {
            let page: ListPage = self.get_json(&url).await?;
            debug!(url = %url, count = page.results.len(), "Fetched list page");
            entries.extend(page.results);
            next = page.next;
        }

        Ok(entries)
    }

    async fn fetch_detail(&self, url: &str) -> Result<PokemonDetail, ApiError> {
        self.get_json(url).await
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let bytes = self.get(url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Parses a response body, attaching the URL to any error
fn parse_body<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|source| ApiError::Parse {
        url: url.to_string(),
        source,
    })
}
