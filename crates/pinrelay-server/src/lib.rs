//! pinrelay HTTP server
//!
//! Exposes the core search relay and image proxy over HTTP:
//!
//! - `GET /search/pins/?q=&bookmark=&csrftoken=` relays a search and
//!   returns JSON with proxy image URLs and the next bookmark
//! - `GET /image?url=` streams an allow-listed image back
//! - `GET /health` reports liveness
//! - `GET /static/*` serves files from the static directory

pub mod config;
pub mod error;
pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use pinrelay_core::{ImageProxy, RelayClient, RelayError, SearchRelay};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Args;

/// Shared application state
///
/// Everything inside is immutable after startup, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchRelay>,
    pub proxy: Arc<ImageProxy>,
    pub forward_content_type: bool,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Build the relay and proxy from parsed configuration
    ///
    /// # Errors
    /// Returns an error if the outbound HTTP client cannot be created
    pub fn from_args(args: &Args) -> Result<Self, RelayError> {
        let allow_list = args.allow_list();
        let client = RelayClient::with_config(args.client_config(), &allow_list)?;

        Ok(Self {
            search: Arc::new(SearchRelay::new(
                client.clone(),
                allow_list.clone(),
                args.search_config(),
            )),
            proxy: Arc::new(ImageProxy::new(client, allow_list)),
            forward_content_type: args.forward_content_type,
            static_dir: args.static_dir.clone(),
        })
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/search/pins/", get(handlers::search_pins))
        .route("/image", get(handlers::proxy_image))
        .nest_service("/static", static_files)
        .with_state(state)
}

/// HTTP server for pinrelay
pub struct Server {
    addr: SocketAddr,
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the server until `shutdown` resolves
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let app = build_router(self.state).layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!("Server listening on {}", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Bind host is neither an IP address nor a resolvable hostname
    #[error("Invalid bind host: {0}")]
    InvalidHost(String),

    /// Failed to bind to address
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    /// Failed to serve requests
    #[error("Server error: {0}")]
    Serve(String),
}
