//! Image proxy
//!
//! Fetches image bytes from an allow-listed host so the browser only ever
//! talks to this relay.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use tracing::{debug, warn};

use crate::client::RelayClient;
use crate::error::{RelayError, Result};
use crate::gate::AllowList;
use crate::types::ProxiedImage;

/// Fetches images on behalf of the browser
pub struct ImageProxy {
    client: RelayClient,
    allow_list: AllowList,
}

impl ImageProxy {
    /// Create a new proxy over the given client and allow-list
    pub fn new(client: RelayClient, allow_list: AllowList) -> Self {
        Self { client, allow_list }
    }

    /// Fetch an image
    ///
    /// The allow-list is checked before any network access. Only an exact
    /// `200 OK` counts as success; the body is returned untouched.
    ///
    /// # Errors
    /// - `AuthorizationDenied` - host is not on the allow-list
    /// - `FetchFailed` - transport error or non-OK status
    pub async fn fetch(&self, raw_url: &str) -> Result<ProxiedImage> {
        if !self.allow_list.is_allowed(raw_url) {
            warn!(url = %raw_url, "Rejected image request for host outside allow-list");
            return Err(RelayError::AuthorizationDenied(raw_url.to_string()));
        }

        let response = self
            .client
            .get(raw_url, HeaderMap::new())
            .await
            .map_err(|e| RelayError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RelayError::FetchFailed(format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::FetchFailed(e.to_string()))?;

        debug!(url = %raw_url, size = bytes.len(), "Image fetched");

        Ok(ProxiedImage {
            bytes,
            content_type,
        })
    }
}
