//! Core data types for the search relay and image proxy

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An inbound search request
///
/// `bookmark` is the opaque pagination cursor handed out by the upstream
/// on the previous page; empty for the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    pub text: String,

    /// Pagination cursor, passed through uninterpreted
    pub bookmark: String,

    /// Anti-forgery token forwarded to the upstream API
    pub csrf_token: Option<String>,
}

impl SearchQuery {
    /// Create a first-page query without a CSRF token
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the pagination cursor
    pub fn with_bookmark(mut self, bookmark: impl Into<String>) -> Self {
        self.bookmark = bookmark.into();
        self
    }

    /// Set the CSRF token; empty tokens are treated as absent
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.csrf_token = if token.is_empty() { None } else { Some(token) };
        self
    }
}

/// One hit from the upstream search API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResult {
    /// URL of the original, highest-resolution image (may be empty)
    pub image_url: String,
}

/// A decoded page of upstream results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamPage {
    /// Hits in upstream order
    pub results: Vec<UpstreamResult>,

    /// Cursor for the next page, if the upstream returned one
    pub bookmark: Option<String>,
}

/// Result of a relayed search
///
/// `images` are same-origin proxy URLs in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Proxy URLs pointing at `/image`
    pub images: Vec<String>,

    /// Next-page cursor, empty when the upstream sent none
    pub bookmark: String,
}

/// Image bytes fetched through the proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedImage {
    /// Body exactly as received from the image host
    pub bytes: Bytes,

    /// `Content-Type` reported by the image host, if any
    pub content_type: Option<String>,
}
