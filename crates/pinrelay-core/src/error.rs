//! Error types for the pinrelay core
//!
//! One variant per failure mode of the search relay and the image proxy.
//! The HTTP layer maps each variant to a status code.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all relay and proxy operations
///
/// Implements Display for human-readable messages and Serialize
/// so it can be embedded directly in JSON error bodies.
#[derive(Error, Debug)]
pub enum RelayError {
    /// A required setting (e.g. the public base URL) is not configured
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The outbound request could not be constructed
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// The outbound HTTP call failed at the transport level
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream response body could not be decoded
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    /// The URL's host is not on the allow-list
    #[error("Domain not allowed: {0}")]
    AuthorizationDenied(String),

    /// The image host returned an error or a non-OK status
    #[error("Failed to fetch image: {0}")]
    FetchFailed(String),
}

impl RelayError {
    /// Whether the error was raised by the allow-list check
    pub fn is_authorization_denied(&self) -> bool {
        matches!(self, RelayError::AuthorizationDenied(_))
    }
}

impl Serialize for RelayError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
