//! Search response parser for the upstream API
//!
//! Decodes the `BaseSearchResource` JSON envelope and extracts the
//! original image URL of each hit plus the next-page bookmark.

use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::types::{UpstreamPage, UpstreamResult};

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    resource_response: ResourceResponse,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: ResourceData,
    #[serde(default)]
    bookmark: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceData {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<Pin>,
}

#[derive(Debug, Default, Deserialize)]
struct Pin {
    #[serde(default, deserialize_with = "null_as_default")]
    images: PinImages,
}

#[derive(Debug, Default, Deserialize)]
struct PinImages {
    #[serde(default, deserialize_with = "null_as_default")]
    orig: PinImage,
}

#[derive(Debug, Default, Deserialize)]
struct PinImage {
    #[serde(default, deserialize_with = "null_as_default")]
    url: String,
}

// The upstream sends `null` for missing objects in some hits (ads, stories).
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses an upstream search response body
///
/// # Arguments
/// * `body` - Raw JSON body returned by the search resource
///
/// # Returns
/// An `UpstreamPage` with one entry per hit in upstream order. Hits
/// without an original image decode with an empty `image_url`.
///
/// # Errors
/// Returns `Decode` if the body is not valid JSON or has the wrong shape
pub fn parse_search_response(body: &str) -> Result<UpstreamPage> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| RelayError::Decode(e.to_string()))?;

    let ResourceResponse { data, bookmark } = envelope.resource_response;

    let results = data
        .results
        .into_iter()
        .map(|pin| UpstreamResult {
            image_url: pin.images.orig.url,
        })
        .collect();

    Ok(UpstreamPage { results, bookmark })
}
