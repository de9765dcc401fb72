// src/fetch.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::LookupError;

/// Browser-like agent; the registry rejects default library agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Reduce a free-form carrier identifier (`MC-123456`, `mc 123456`, `123456`)
/// to its digits.
pub fn identifier_digits(identifier: &str) -> Result<String, LookupError> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(LookupError::MissingIdentifier);
    }
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(LookupError::InvalidIdentifier(trimmed.to_string()));
    }
    Ok(digits)
}

/// Build an HTTP client with a finite timeout, bounded redirects and a browser agent.
pub fn build_client(
    timeout: Duration,
    max_redirects: usize,
    user_agent: &str,
) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::limited(max_redirects))
        .user_agent(user_agent)
        .build()
}

/// Source of carrier snapshot markup.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the snapshot page for a digits-only identifier.
    async fn fetch(&self, digits: &str) -> Result<String, LookupError>;
}

/// Fetches snapshot pages from the SAFER carrier registry.
#[derive(Debug, Clone)]
pub struct SaferClient {
    client: Client,
    endpoint: Url,
}

impl SaferClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn snapshot_url(&self, digits: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("searchtype", "ANY")
            .append_pair("query_type", "queryCarrierSnapshot")
            .append_pair("query_param", "MC_MX")
            .append_pair("query_string", digits);
        url
    }

    async fn get_text(&self, url: &Url) -> reqwest::Result<String> {
        self.client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl DocumentSource for SaferClient {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, digits: &str) -> Result<String, LookupError> {
        let url = self.snapshot_url(digits);
        debug!(%url, "fetching carrier snapshot");
        let body = self.get_text(&url).await.map_err(|source| {
            warn!(%url, error = %source, "snapshot fetch failed");
            LookupError::Fetch {
                url: url.to_string(),
                source,
            }
        })?;
        debug!(bytes = body.len(), "snapshot fetched");
        Ok(body)
    }
}
