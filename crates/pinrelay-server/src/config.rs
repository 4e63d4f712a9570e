//! Command-line and environment configuration
//!
//! Every flag falls back to an environment variable, and `main` loads a
//! `.env` file first, so a bare `pinrelay` with `URL=...` in `.env` works.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use clap::Parser;
use pinrelay_core::url::DEFAULT_SEARCH_ENDPOINT;
use pinrelay_core::{AllowList, ClientConfig, DEFAULT_ALLOWED_DOMAINS, SearchConfig};

use crate::ServerError;

/// pinrelay - image search relay and proxy
#[derive(Parser, Debug, Clone)]
#[command(name = "pinrelay")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Externally visible base URL of this service, used in proxy links
    #[arg(long = "url", env = "URL")]
    pub public_url: Option<String>,

    /// Upstream search resource
    #[arg(long, env = "UPSTREAM_ENDPOINT", default_value = DEFAULT_SEARCH_ENDPOINT)]
    pub upstream_endpoint: String,

    /// Timeout for outbound requests, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Retries for transient upstream failures
    #[arg(long, env = "UPSTREAM_MAX_RETRIES", default_value_t = 0)]
    pub upstream_max_retries: u32,

    /// Comma-separated list of hosts images may be proxied from
    #[arg(
        long,
        env = "ALLOWED_DOMAINS",
        value_delimiter = ',',
        default_values_t = default_allowed_domains()
    )]
    pub allowed_domains: Vec<String>,

    /// Forward the image host's content type instead of always sending image/png
    #[arg(long, env = "FORWARD_CONTENT_TYPE")]
    pub forward_content_type: bool,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Log output format: json or pretty
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: String,
}

fn default_allowed_domains() -> Vec<String> {
    DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect()
}

impl Args {
    /// Address the server binds to
    ///
    /// IP literals are used as-is; hostnames such as `localhost` are
    /// resolved and the first address wins.
    ///
    /// # Errors
    /// Returns `InvalidHost` if the host neither parses nor resolves
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        if let Ok(ip) = self.host.parse() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ServerError::InvalidHost(format!("{}: {}", self.host, e)))?
            .next()
            .ok_or_else(|| ServerError::InvalidHost(format!("{}: no addresses", self.host)))
    }

    /// Allow-list built from `--allowed-domains`
    pub fn allow_list(&self) -> AllowList {
        AllowList::new(&self.allowed_domains)
    }

    /// Outbound client settings
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout_secs: self.upstream_timeout_secs,
            max_retries: self.upstream_max_retries,
            ..Default::default()
        }
    }

    /// Search relay settings
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            endpoint: self.upstream_endpoint.clone(),
            self_base_url: self
                .public_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
        }
    }
}
