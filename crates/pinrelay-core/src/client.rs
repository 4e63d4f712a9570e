//! Outbound HTTP client for the relay
//!
//! Wraps a shared `reqwest::Client` with a bounded timeout, an optional
//! retry budget (zero by default) and a redirect policy that never leaves
//! the allow-list.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::redirect::{Attempt, Policy};
use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::gate::AllowList;

const MAX_REDIRECTS: usize = 5;

/// Configuration for the outbound HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
    /// Retry attempts for transient errors (default: 0)
    pub max_retries: u32,
    /// User-Agent header sent upstream (default: none)
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 0,
            user_agent: None,
        }
    }
}

/// HTTP client shared by the search relay and the image proxy
///
/// Cheap to clone; clones share the underlying connection pool.
/// Does not keep a cookie jar, so credentials from one inbound request
/// never leak into another.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    max_retries: u32,
}

impl RelayClient {
    /// Create a new client with default configuration
    pub fn new(allow_list: &AllowList) -> Result<Self> {
        Self::with_config(ClientConfig::default(), allow_list)
    }

    /// Create a new client with custom configuration
    ///
    /// Redirects are followed only while the target host stays on
    /// `allow_list`; otherwise the redirect response itself is returned.
    pub fn with_config(config: ClientConfig, allow_list: &AllowList) -> Result<Self> {
        let gate = allow_list.clone();
        let policy = Policy::custom(move |attempt: Attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if gate.is_allowed(attempt.url().as_str()) {
                attempt.follow()
            } else {
                warn!(target_url = %attempt.url(), "Refusing redirect to host outside allow-list");
                attempt.stop()
            }
        });

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(policy);
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build()
            .map_err(RelayError::Transport)?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    /// Issue a GET request
    ///
    /// The response is returned whatever its status; callers decide what
    /// counts as success. Transport errors and 5xx responses are retried
    /// up to `max_retries` times with exponential backoff.
    ///
    /// # Errors
    /// - `Transport` - the request could not be sent or timed out
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            let result = self.client.get(url).headers(headers.clone()).send().await;

            let retryable = match &result {
                Ok(response) => response.status().is_server_error(),
                Err(e) => Self::is_retryable(e),
            };

            if !retryable || attempt >= self.max_retries {
                if let Ok(response) = &result {
                    debug!(url = %url, status = %response.status(), "Upstream responded");
                }
                return result.map_err(RelayError::Transport);
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let backoff = Duration::from_secs(1 << attempt.min(5));
            warn!(
                url = %url,
                attempt = attempt + 1,
                backoff_secs = backoff.as_secs(),
                "Retrying upstream request"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    /// Check if a transport error is worth retrying
    fn is_retryable(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    /// Configured retry budget
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
