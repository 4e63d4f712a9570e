//! Search relay
//!
//! Forwards a query to the upstream search resource and rewrites every
//! allowed image URL into a proxy URL served by this relay.

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, warn};

use crate::client::RelayClient;
use crate::error::{RelayError, Result};
use crate::gate::AllowList;
use crate::parser::parse_search_response;
use crate::types::{SearchQuery, SearchResponse, UpstreamPage};
use crate::url::{DEFAULT_SEARCH_ENDPOINT, build_proxy_url, build_search_url};

const CSRF_HEADER: &str = "x-csrftoken";

/// Configuration for the search relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Upstream search resource
    pub endpoint: String,
    /// Public base URL of this relay, used to build proxy links
    pub self_base_url: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            self_base_url: None,
        }
    }
}

/// Relays search queries to the upstream API
pub struct SearchRelay {
    client: RelayClient,
    allow_list: AllowList,
    config: SearchConfig,
}

impl SearchRelay {
    /// Create a new relay
    ///
    /// # Arguments
    /// * `client` - Shared outbound client
    /// * `allow_list` - Hosts whose images may be handed out
    /// * `config` - Endpoint and public base URL
    pub fn new(client: RelayClient, allow_list: AllowList, config: SearchConfig) -> Self {
        Self {
            client,
            allow_list,
            config,
        }
    }

    /// Whether a public base URL is configured
    pub fn is_configured(&self) -> bool {
        self.base_url().is_some()
    }

    fn base_url(&self) -> Option<&str> {
        self.config
            .self_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Search for images
    ///
    /// # Arguments
    /// * `query` - Query text, bookmark and optional CSRF token
    ///
    /// # Returns
    /// Proxy URLs for every allowed hit in upstream order, plus the
    /// next-page bookmark (empty if the upstream sent none)
    ///
    /// A non-2xx upstream status is logged but not treated as an error: the
    /// body is still decoded, so a JSON error envelope yields an empty page.
    ///
    /// # Errors
    /// - `ConfigurationMissing` - no public base URL; no request is made
    /// - `RequestBuild` - the upstream URL or headers could not be built
    /// - `Transport` - the upstream call failed
    /// - `Decode` - the upstream body was not the expected JSON
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> pinrelay_core::Result<()> {
    /// use pinrelay_core::{AllowList, RelayClient, SearchConfig, SearchQuery, SearchRelay};
    /// let allow_list = AllowList::default();
    /// let client = RelayClient::new(&allow_list)?;
    /// let config = SearchConfig {
    ///     self_base_url: Some("http://localhost:3000".to_string()),
    ///     ..Default::default()
    /// };
    /// let relay = SearchRelay::new(client, allow_list, config);
    /// let page = relay.search(&SearchQuery::new("cats")).await?;
    /// for image in &page.images {
    ///     println!("{}", image);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let base_url = self
            .base_url()
            .ok_or_else(|| RelayError::ConfigurationMissing("URL is not set".to_string()))?;

        let url = build_search_url(&self.config.endpoint, &query.text, &query.bookmark)?;
        let headers = csrf_headers(query.csrf_token.as_deref())?;

        debug!(query = %query.text, bookmark = %query.bookmark, "Relaying search upstream");

        let response = self.client.get(&url, headers).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upstream search returned non-success status");
        }

        let body = response.text().await.map_err(RelayError::Transport)?;
        let page = parse_search_response(&body)?;

        let result = self.rewrite(base_url, page);
        info!(
            query = %query.text,
            images = result.images.len(),
            has_next = !result.bookmark.is_empty(),
            "Search relayed"
        );
        Ok(result)
    }

    /// Filter a decoded page through the allow-list and build proxy URLs
    fn rewrite(&self, base_url: &str, page: UpstreamPage) -> SearchResponse {
        let images = page
            .results
            .into_iter()
            .map(|result| result.image_url)
            .filter(|url| !url.is_empty())
            .filter(|url| {
                let allowed = self.allow_list.is_allowed(url);
                if !allowed {
                    debug!(url = %url, "Dropping image outside allow-list");
                }
                allowed
            })
            .map(|url| build_proxy_url(base_url, &url))
            .collect();

        SearchResponse {
            images,
            bookmark: page.bookmark.unwrap_or_default(),
        }
    }
}

/// Builds the CSRF header pair the upstream requires
///
/// The token goes out both as `x-csrftoken` and as a `csrftoken` cookie.
fn csrf_headers(token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(headers);
    };

    let header_value = HeaderValue::from_str(token)
        .map_err(|e| RelayError::RequestBuild(format!("invalid CSRF token: {e}")))?;
    let cookie_value = HeaderValue::from_str(&format!("csrftoken={token}"))
        .map_err(|e| RelayError::RequestBuild(format!("invalid CSRF token: {e}")))?;

    headers.insert(HeaderName::from_static(CSRF_HEADER), header_value);
    headers.insert(COOKIE, cookie_value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpstreamResult;
    use crate::url::extract_proxied_url;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "http://localhost:3000";

    fn relay_for(endpoint: String, base: Option<&str>) -> SearchRelay {
        let allow_list = AllowList::default();
        let client = RelayClient::new(&allow_list).unwrap();
        SearchRelay::new(
            client,
            allow_list,
            SearchConfig {
                endpoint,
                self_base_url: base.map(str::to_string),
            },
        )
    }

    fn upstream_body(urls: &[&str], bookmark: Option<&str>) -> serde_json::Value {
        let results: Vec<_> = urls
            .iter()
            .map(|u| serde_json::json!({"images": {"orig": {"url": u}}}))
            .collect();
        let mut response = serde_json::json!({"data": {"results": results}});
        if let Some(b) = bookmark {
            response["bookmark"] = serde_json::json!(b);
        }
        serde_json::json!({ "resource_response": response })
    }

    #[test]
    fn test_csrf_headers_empty() {
        assert!(csrf_headers(None).unwrap().is_empty());
        assert!(csrf_headers(Some("")).unwrap().is_empty());
    }

    #[test]
    fn test_csrf_headers_both_forms() {
        let headers = csrf_headers(Some("tok123")).unwrap();
        assert_eq!(headers.get("x-csrftoken").unwrap(), "tok123");
        assert_eq!(headers.get(COOKIE).unwrap(), "csrftoken=tok123");
    }

    #[test]
    fn test_csrf_headers_rejects_control_chars() {
        let result = csrf_headers(Some("bad\ntoken"));
        assert!(matches!(result, Err(RelayError::RequestBuild(_))));
    }

    #[test]
    fn test_rewrite_filters_and_preserves_order() {
        let relay = relay_for(DEFAULT_SEARCH_ENDPOINT.to_string(), Some(BASE));
        let page = UpstreamPage {
            results: vec![
                UpstreamResult { image_url: "https://i.pinimg.com/originals/1.jpg".to_string() },
                UpstreamResult { image_url: String::new() },
                UpstreamResult { image_url: "https://evil.com/2.jpg".to_string() },
                UpstreamResult { image_url: "https://s.pinimg.com/3.png".to_string() },
            ],
            bookmark: None,
        };

        let response = relay.rewrite(BASE, page);

        let originals: Vec<String> = response
            .images
            .iter()
            .map(|u| extract_proxied_url(u).unwrap())
            .collect();
        assert_eq!(
            originals,
            vec![
                "https://i.pinimg.com/originals/1.jpg".to_string(),
                "https://s.pinimg.com/3.png".to_string(),
            ]
        );
        assert!(response.images.iter().all(|u| u.starts_with("http://localhost:3000/image?url=")));
        assert_eq!(response.bookmark, "");
    }

    #[test]
    fn test_is_configured() {
        assert!(relay_for(DEFAULT_SEARCH_ENDPOINT.to_string(), Some(BASE)).is_configured());
        assert!(!relay_for(DEFAULT_SEARCH_ENDPOINT.to_string(), None).is_configured());
        assert!(!relay_for(DEFAULT_SEARCH_ENDPOINT.to_string(), Some("  ")).is_configured());
    }

    #[tokio::test]
    async fn test_search_without_base_url_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let relay = relay_for(format!("{}/get/", mock_server.uri()), None);
        let result = relay.search(&SearchQuery::new("cats")).await;

        assert!(matches!(result, Err(RelayError::ConfigurationMissing(_))));
    }

    #[tokio::test]
    async fn test_search_relays_and_rewrites() {
        let mock_server = MockServer::start().await;
        let body = upstream_body(
            &[
                "https://i.pinimg.com/originals/a.jpg",
                "https://pinimg.com.evil.com/b.jpg",
                "https://i.pinimg.com/originals/c.jpg",
            ],
            Some("next-page"),
        );
        Mock::given(method("GET"))
            .and(path("/resource/BaseSearchResource/get/"))
            .and(query_param(
                "data",
                r#"{"options":{"bookmarks":["prev"],"query":"red shoes"}}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = relay_for(
            format!("{}/resource/BaseSearchResource/get/", mock_server.uri()),
            Some(BASE),
        );
        let query = SearchQuery::new("red shoes").with_bookmark("prev");
        let response = relay.search(&query).await.unwrap();

        assert_eq!(
            response.images,
            vec![
                build_proxy_url(BASE, "https://i.pinimg.com/originals/a.jpg"),
                build_proxy_url(BASE, "https://i.pinimg.com/originals/c.jpg"),
            ]
        );
        assert_eq!(response.bookmark, "next-page");
    }

    #[tokio::test]
    async fn test_search_forwards_csrf_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-csrftoken", "tok"))
            .and(header("cookie", "csrftoken=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(&[], None)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = relay_for(format!("{}/get/", mock_server.uri()), Some(BASE));
        let query = SearchQuery::new("cats").with_csrf_token("tok");
        let response = relay.search(&query).await.unwrap();

        assert!(response.images.is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_results() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body(&[], None)))
            .mount(&mock_server)
            .await;

        let relay = relay_for(format!("{}/get/", mock_server.uri()), Some(BASE));
        let response = relay.search(&SearchQuery::new("nothing")).await.unwrap();

        assert!(response.images.is_empty());
        assert_eq!(response.bookmark, "");
    }

    #[tokio::test]
    async fn test_search_non_success_json_envelope_is_empty_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(
                serde_json::json!({"resource_response": {"status": "failure", "data": null}}),
            ))
            .mount(&mock_server)
            .await;

        let relay = relay_for(format!("{}/get/", mock_server.uri()), Some(BASE));
        let response = relay.search(&SearchQuery::new("cats")).await.unwrap();

        assert!(response.images.is_empty());
        assert_eq!(response.bookmark, "");
    }

    #[tokio::test]
    async fn test_search_decode_failure_returns_no_images() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&mock_server)
            .await;

        let relay = relay_for(format!("{}/get/", mock_server.uri()), Some(BASE));
        let result = relay.search(&SearchQuery::new("cats")).await;

        assert!(matches!(result, Err(RelayError::Decode(_))));
    }

    #[tokio::test]
    async fn test_search_transport_failure() {
        let relay = relay_for("http://127.0.0.1:1/get/".to_string(), Some(BASE));
        let result = relay.search(&SearchQuery::new("cats")).await;
        assert!(matches!(result, Err(RelayError::Transport(_))));
    }

    #[tokio::test]
    async fn test_search_invalid_endpoint() {
        let relay = relay_for("not a url".to_string(), Some(BASE));
        let result = relay.search(&SearchQuery::new("cats")).await;
        assert!(matches!(result, Err(RelayError::RequestBuild(_))));
    }
}
