//! pinrelay core library
//!
//! Relays image searches to Pinterest's search resource and proxies the
//! resulting images so the browser never contacts the original hosts.
//!
//! # Overview
//!
//! - [`AllowList`] decides which hosts may be handed out or fetched
//! - [`SearchRelay`] forwards a query upstream and rewrites image URLs
//!   into same-origin proxy URLs
//! - [`ImageProxy`] fetches image bytes from an allowed host
//! - [`RelayClient`] is the shared outbound HTTP client
//!
//! # Example
//!
//! ```no_run
//! use pinrelay_core::{
//!     AllowList, ImageProxy, RelayClient, Result, SearchConfig, SearchQuery, SearchRelay,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let allow_list = AllowList::default();
//!     let client = RelayClient::new(&allow_list)?;
//!
//!     let relay = SearchRelay::new(
//!         client.clone(),
//!         allow_list.clone(),
//!         SearchConfig {
//!             self_base_url: Some("http://localhost:3000".to_string()),
//!             ..Default::default()
//!         },
//!     );
//!     let page = relay.search(&SearchQuery::new("mid century chairs")).await?;
//!     println!("{} images, next bookmark {:?}", page.images.len(), page.bookmark);
//!
//!     let proxy = ImageProxy::new(client, allow_list);
//!     let image = proxy.fetch("https://i.pinimg.com/originals/ab/cd/ef.jpg").await?;
//!     println!("{} bytes", image.bytes.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod gate;
pub mod parser;
mod proxy;
mod search;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, RelayClient};

// Re-export error types
pub use error::{RelayError, Result};

// Re-export allow-list
pub use gate::{AllowList, DEFAULT_ALLOWED_DOMAINS};

// Re-export parser functions
pub use parser::parse_search_response;

// Re-export relay and proxy
pub use proxy::ImageProxy;
pub use search::{SearchConfig, SearchRelay};

// Re-export data types
pub use types::{ProxiedImage, SearchQuery, SearchResponse, UpstreamPage, UpstreamResult};

// Re-export URL helper functions for convenience
pub use crate::url::{build_proxy_url, build_search_url, extract_proxied_url};
