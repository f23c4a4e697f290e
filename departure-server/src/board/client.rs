//! HTTP client for the KVB departure monitor.
//!
//! One GET per call, no retries. The request runs under the caller's
//! deadline and cancellation token; the client-level timeout is only a
//! backstop.

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::domain::StopId;
use crate::request::RequestContext;

use super::error::FetchError;
use super::source::{BoardSource, RawDocument, charset_from_content_type, within_context};

/// Default base URL of the departure monitor.
const DEFAULT_BASE_URL: &str = "https://www.kvb.koeln";

/// Path of the generated departure page, relative to the base URL.
const BOARD_PATH: &str = "/generated/";

/// Default client-level timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the board client.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Base URL for the departure monitor
    pub base_url: String,
    /// Client-level request timeout in seconds
    pub timeout_secs: u64,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl BoardConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the client-level timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Departure monitor client.
#[derive(Debug, Clone)]
pub struct BoardClient {
    http: reqwest::Client,
    board_url: String,
}

impl BoardClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BoardConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| FetchError::Config(format!("invalid user agent {:?}", config.user_agent)))?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            board_url: format!("{}{}", config.base_url.trim_end_matches('/'), BOARD_PATH),
        })
    }

    /// Fetch the departure page for a stop.
    ///
    /// Fails with [`FetchError::Cancelled`] if the context is cancelled
    /// first, [`FetchError::DeadlineExceeded`] if its deadline passes, and
    /// with `Http`/`Status` for network failures and non-success responses.
    pub async fn get_board(
        &self,
        stop: StopId,
        ctx: &RequestContext,
    ) -> Result<RawDocument, FetchError> {
        let code = stop.to_string();

        let request = async {
            let response = self
                .http
                .get(&self.board_url)
                .query(&[("aktion", "show"), ("code", code.as_str())])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                warn!(%stop, status = status.as_u16(), "departure monitor returned error status");
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }

            let charset = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(charset_from_content_type);

            let body = response.bytes().await?;
            debug!(%stop, bytes = body.len(), ?charset, "fetched departure page");

            Ok::<_, FetchError>(RawDocument::new(body.to_vec(), charset))
        };

        within_context(ctx, request).await
    }
}

impl BoardSource for BoardClient {
    fn fetch<'a>(
        &'a self,
        stop: StopId,
        ctx: &'a RequestContext,
    ) -> BoxFuture<'a, Result<RawDocument, FetchError>> {
        self.get_board(stop, ctx).boxed()
    }
}
