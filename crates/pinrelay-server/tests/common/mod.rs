//! Common helpers for HTTP-level tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use pinrelay_core::{AllowList, ClientConfig, ImageProxy, RelayClient, SearchConfig, SearchRelay};
use pinrelay_server::{AppState, build_router};
use tower::ServiceExt;

pub const PUBLIC_URL: &str = "http://relay.test";

/// Options for building a test router
pub struct TestApp {
    pub endpoint: String,
    pub public_url: Option<String>,
    pub allowed: Vec<String>,
    pub forward_content_type: bool,
}

impl TestApp {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            public_url: Some(PUBLIC_URL.to_string()),
            allowed: vec![
                "pinimg.com".to_string(),
                "i.pinimg.com".to_string(),
                "pinterest.com".to_string(),
            ],
            forward_content_type: false,
        }
    }

    pub fn allow(mut self, domain: &str) -> Self {
        self.allowed.push(domain.to_string());
        self
    }

    pub fn without_public_url(mut self) -> Self {
        self.public_url = None;
        self
    }

    pub fn forwarding_content_type(mut self) -> Self {
        self.forward_content_type = true;
        self
    }

    pub fn router(self) -> Router {
        let allow_list = AllowList::new(&self.allowed);
        let config = ClientConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        let client = RelayClient::with_config(config, &allow_list).expect("client should build");

        let state = AppState {
            search: Arc::new(SearchRelay::new(
                client.clone(),
                allow_list.clone(),
                SearchConfig {
                    endpoint: self.endpoint,
                    self_base_url: self.public_url,
                },
            )),
            proxy: Arc::new(ImageProxy::new(client, allow_list)),
            forward_content_type: self.forward_content_type,
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/static"),
        };

        build_router(state)
    }
}

/// Send a GET through the router
pub async fn get(router: Router, uri: &str) -> Response<Body> {
    router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router is infallible")
}

/// Collect a response body
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec()
}

/// Collect a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
}

/// Upstream search JSON with one hit per URL
pub fn upstream_search_body(urls: &[&str], bookmark: Option<&str>) -> serde_json::Value {
    let results: Vec<_> = urls
        .iter()
        .map(|u| serde_json::json!({ "images": { "orig": { "url": u } } }))
        .collect();
    let mut response = serde_json::json!({ "data": { "results": results } });
    if let Some(b) = bookmark {
        response["bookmark"] = serde_json::json!(b);
    }
    serde_json::json!({ "resource_response": response })
}
