// crates/client/src/client.rs
//! HTTP client for the index server.

use std::time::Duration;

use tracing::{debug, warn};
use wikidex_types::{IndexDocument, SearchParams};

use crate::error::{ClientError, Result};

/// Bound on every outbound call. A slow index is treated like a down
/// index: failure, subject to the best-effort policy.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable carrying the index server base URL. When it is
/// unset the owning application runs without remote indexing at all.
pub const INDEX_URL_ENV: &str = "INDEX_SERVER_URL";

/// Client for the wikidex index server.
pub struct IndexClient {
    base_url: String,
    http: reqwest::Client,
}

impl IndexClient {
    /// Create a client for the given base URL, e.g. `http://localhost:7700`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("reqwest client with static configuration");
        Self { base_url, http }
    }

    /// Build a client from `INDEX_SERVER_URL`, or `None` when the variable
    /// is unset or empty — remote indexing and search are then disabled and
    /// the owning application operates purely against its local store.
    pub fn from_env() -> Option<Self> {
        std::env::var(INDEX_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Push a document's current state to the index. Best effort: the
    /// authoritative write has already committed, so any failure here is
    /// logged and swallowed, never surfaced to the caller.
    pub async fn index_document(&self, doc: &IndexDocument) {
        if let Err(e) = self.try_index(doc).await {
            warn!(doc_id = doc.id, error = %e, "index push failed, continuing without remote index");
        } else {
            debug!(doc_id = doc.id, "document pushed to index");
        }
    }

    /// Remove a document from the index. Best effort, same policy as
    /// [`index_document`](Self::index_document).
    pub async fn remove_document(&self, id: i64) {
        if let Err(e) = self.try_remove(id).await {
            warn!(doc_id = id, error = %e, "index delete failed, continuing without remote index");
        } else {
            debug!(doc_id = id, "document removed from index");
        }
    }

    /// Query the index for matching document ids.
    ///
    /// Fallible on purpose: an `Err` — timeout, refused connection, or a
    /// non-2xx answer — is the signal to fall back to local search and
    /// surface a non-fatal "search service unavailable" notice.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<i64>> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&params.to_query_pairs())
            .send()
            .await?;
        let response = ok_status(response)?;
        Ok(response.json().await?)
    }

    /// Probe the server's liveness endpoint.
    pub async fn health(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        ok_status(response)?;
        Ok(())
    }

    async fn try_index(&self, doc: &IndexDocument) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/index", self.base_url))
            .json(&doc.to_request())
            .send()
            .await?;
        ok_status(response)?;
        Ok(())
    }

    async fn try_remove(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/index/{}", self.base_url, id))
            .send()
            .await?;
        ok_status(response)?;
        Ok(())
    }
}

fn ok_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status(status))
    }
}
