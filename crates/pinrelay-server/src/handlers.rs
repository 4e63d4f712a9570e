//! Route handlers
//!
//! Thin adapters between axum extractors and the core relay/proxy.

use axum::{
    Json,
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use pinrelay_core::SearchQuery;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

/// Content type declared for proxied images unless forwarding is enabled
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/png";

/// Query parameters of `/search/pins/`
///
/// Missing parameters are treated as empty strings.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub bookmark: String,
    #[serde(default)]
    pub csrftoken: String,
}

/// Body of a successful search
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchPage {
    /// Proxy URLs in upstream order
    pub images: Vec<String>,
    /// Cursor for the next page
    pub bookmark: String,
    /// Echoed query text
    pub query: String,
    /// Echoed CSRF token, for the next-page link
    pub csrftoken: String,
}

/// Query parameters of `/image`
#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    #[serde(default)]
    pub url: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Relay a search to the upstream API
pub async fn search_pins(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, ApiError> {
    let query = SearchQuery::new(params.q.clone())
        .with_bookmark(params.bookmark)
        .with_csrf_token(params.csrftoken.clone());

    let result = state.search.search(&query).await?;

    Ok(Json(SearchPage {
        images: result.images,
        bookmark: result.bookmark,
        query: params.q,
        csrftoken: params.csrftoken,
    }))
}

/// Proxy an image from an allow-listed host
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ImageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.proxy.fetch(&params.url).await?;

    let content_type =
        response_content_type(state.forward_content_type, image.content_type.as_deref());

    Ok(([(CONTENT_TYPE, content_type)], image.bytes))
}

/// Health check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Picks the content type declared for a proxied image
///
/// Without forwarding this is always `image/png`, whatever the source
/// format. With forwarding, the upstream type is used when it is an
/// `image/*` type.
pub fn response_content_type(forward: bool, upstream: Option<&str>) -> String {
    match upstream {
        Some(ct) if forward && ct.trim().to_ascii_lowercase().starts_with("image/") => {
            ct.trim().to_string()
        }
        _ => DEFAULT_IMAGE_CONTENT_TYPE.to_string(),
    }
}
