//! URL helper functions for the search relay
//!
//! Builds the upstream search URL and the same-origin proxy URLs that
//! point back at `/image`.

use serde::Serialize;
use url::Url;

use crate::error::{RelayError, Result};

/// Pinterest search resource used when no endpoint is configured
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.pinterest.com/resource/BaseSearchResource/get/";

/// Path of the image proxy route, relative to the public base URL
pub const IMAGE_PROXY_PATH: &str = "/image";

#[derive(Serialize)]
struct SearchPayload<'a> {
    options: SearchOptions<'a>,
}

// Field order matches the upstream's own key order.
#[derive(Serialize)]
struct SearchOptions<'a> {
    bookmarks: [&'a str; 1],
    query: &'a str,
}

/// Builds the `data` payload the upstream search resource expects
///
/// `bookmarks` is always a one-element array, even for the first page
/// where the bookmark is empty.
///
/// # Example
/// ```
/// use pinrelay_core::url::build_search_payload;
/// let payload = build_search_payload("cats", "").unwrap();
/// assert_eq!(payload, r#"{"options":{"bookmarks":[""],"query":"cats"}}"#);
/// ```
pub fn build_search_payload(query: &str, bookmark: &str) -> Result<String> {
    let payload = SearchPayload {
        options: SearchOptions {
            bookmarks: [bookmark],
            query,
        },
    };
    serde_json::to_string(&payload).map_err(|e| RelayError::RequestBuild(e.to_string()))
}

/// Builds the full upstream search URL
///
/// URL encodes the JSON payload and appends it as the `data` query
/// parameter of `endpoint`.
///
/// # Errors
/// Returns `RequestBuild` if `endpoint` is not an absolute http(s) URL
/// or the payload cannot be encoded
pub fn build_search_url(endpoint: &str, query: &str, bookmark: &str) -> Result<String> {
    let parsed = Url::parse(endpoint)
        .map_err(|e| RelayError::RequestBuild(format!("invalid endpoint {endpoint}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RelayError::RequestBuild(format!(
            "unsupported endpoint scheme: {}",
            parsed.scheme()
        )));
    }

    let payload = build_search_payload(query, bookmark)?;
    let separator = if endpoint.contains('?') { '&' } else { '?' };

    Ok(format!(
        "{}{}data={}",
        endpoint,
        separator,
        urlencoding::encode(&payload)
    ))
}

/// Builds a same-origin proxy URL for an original image URL
///
/// A trailing slash on `base_url` is dropped so the result never
/// contains `//image`.
///
/// # Example
/// ```
/// use pinrelay_core::url::build_proxy_url;
/// let url = build_proxy_url("http://localhost:3000/", "https://i.pinimg.com/a b.jpg");
/// assert_eq!(url, "http://localhost:3000/image?url=https%3A%2F%2Fi.pinimg.com%2Fa%20b.jpg");
/// ```
pub fn build_proxy_url(base_url: &str, original_url: &str) -> String {
    format!(
        "{}{}?url={}",
        base_url.trim_end_matches('/'),
        IMAGE_PROXY_PATH,
        urlencoding::encode(original_url)
    )
}

/// Extracts the original image URL from a proxy URL
///
/// Inverse of [`build_proxy_url`].
///
/// # Returns
/// `Some(original)` if the URL carries a `url` query parameter, `None` otherwise
pub fn extract_proxied_url(proxy_url: &str) -> Option<String> {
    let parsed = Url::parse(proxy_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}
