//! HTTP client for the Codeforces contest catalog.
//!
//! `ApiClient` issues the single read-only `contest.list` request and turns
//! the response envelope into either a contest list or an `ApiError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::models::{Contest, ContestListResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the public Codeforces API
pub const DEFAULT_API_BASE_URL: &str = "https://codeforces.com/api";

/// HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Status value the catalog uses for a successful payload
const STATUS_OK: &str = "OK";

/// Anything that can produce the full contest list.
///
/// The pipeline only talks to this trait so tests can substitute a fake.
#[async_trait]
pub trait ContestSource: Send + Sync {
    async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError>;
}

/// API client for the contest catalog.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the default Codeforces endpoint
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn contest_list_url(&self) -> String {
        format!("{}/contest.list", self.base_url)
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

    /// Decode a `contest.list` body, rejecting envelopes whose status is not "OK".
    pub fn parse_contest_list(body: &str) -> Result<Vec<Contest>, ApiError> {
        let parsed: ContestListResponse = serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("contest.list: {}", e)))?;

        if parsed.status != STATUS_OK {
            let reason = parsed
                .comment
                .unwrap_or_else(|| format!("status {}", parsed.status));
            return Err(ApiError::Upstream(reason));
        }

        Ok(parsed.result)
    }
}

#[async_trait]
impl ContestSource for ApiClient {
    async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError> {
        let url = self.contest_list_url();
        debug!(url = %url, "Fetching contest list");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        let contests = Self::parse_contest_list(&text).inspect_err(|e| {
            warn!(error = %e, "Catalog returned an unusable payload");
        })?;

        debug!(count = contests.len(), "Contest list received");
        Ok(contests)
    }
}
