//! HTTP call source
//!
//! Fetches `GET {base_url}/api/calls` and unwraps the `ApiResponse`
//! envelope. A failure envelope becomes a fetch error carrying the server's
//! message; transport failures surface as network errors.

use async_trait::async_trait;
use callstat_core::error::{CallstatError, Result};
use callstat_core::provider::CallSource;
use callstat_core::types::{ApiResponse, CallRecord};
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the call collection relative to the API base
pub const CALLS_PATH: &str = "/api/calls";

/// Request timeout used unless overridden
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Call source backed by the dashboard HTTP API
pub struct HttpCallSource {
    /// Full URL of the call collection
    url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpCallSource {
    /// Create a source for the API rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    /// Create a source using a preconfigured client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(CallstatError::Config(format!(
                "API URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        Ok(Self {
            url: format!("{base}{CALLS_PATH}"),
            client,
        })
    }

    /// URL the source fetches from
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CallSource for HttpCallSource {
    async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
        debug!("Fetching calls from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        // Error statuses may still carry a failure envelope
        let body = response.text().await?;
        let envelope: ApiResponse<Vec<CallRecord>> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if !status.is_success() => {
                warn!("Call API answered {} without an envelope: {}", status, e);
                return Err(CallstatError::fetch(None));
            }
            Err(e) => return Err(e.into()),
        };

        let calls = envelope.into_result()?;
        debug!("Fetched {} calls", calls.len());
        Ok(calls)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
