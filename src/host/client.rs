//! Host client
//!
//! Main client for the tabletop host's compendium API, combining the
//! HTTP layer with the base URL, the optional API token, and the URL
//! builders for the pack endpoints.

use serde_json::Value;
use url::Url;

use super::http::HostHttpClient;
use crate::error::Result;
use crate::pack::PackRef;

/// Main host client
#[derive(Clone)]
pub struct HostClient {
    http: HostHttpClient,
    base_url: String,
    token: Option<String>,
}

impl HostClient {
    /// Create a new host client. The base URL is validated up front and
    /// kept without a trailing slash.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            crate::error::ImportError::HostOp(format!("invalid host URL '{}': {}", base_url, e))
        })?;

        let http = HostHttpClient::new()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Make a GET request to the host API
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.http.get(url, self.token.as_deref()).await
    }

    /// Make a POST request to the host API
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        self.http.post(url, self.token.as_deref(), body).await
    }

    /// Make a DELETE request to the host API
    pub async fn delete(&self, url: &str) -> Result<Value> {
        self.http.delete(url, self.token.as_deref()).await
    }

    // =========================================================================
    // Compendium API helpers
    // =========================================================================

    /// Build the pack listing URL
    pub fn packs_url(&self) -> String {
        format!("{}/api/packs", self.base_url)
    }

    /// Build the URL of one pack
    pub fn pack_url(&self, pack: &PackRef) -> String {
        format!(
            "{}/api/packs/{}",
            self.base_url,
            urlencoding::encode(&pack.qualified())
        )
    }

    /// Build the index URL of a pack
    pub fn index_url(&self, pack: &PackRef) -> String {
        format!("{}/index", self.pack_url(pack))
    }

    /// Build the entries URL of a pack
    pub fn entries_url(&self, pack: &PackRef) -> String {
        format!("{}/entries", self.pack_url(pack))
    }

    /// Build the URL of one entry
    pub fn entry_url(&self, pack: &PackRef, id: &str) -> String {
        format!("{}/{}", self.entries_url(pack), urlencoding::encode(id))
    }
}
