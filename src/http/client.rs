//! HTTP client setup and middleware configuration.
//!
//! Every transfer attempt gets its own client, built here from an
//! [`HttpClientConfig`]. The client carries the per-request timeouts, optional
//! proxy and default headers, and, when request tracing is on, the
//! `reqwest-tracing` middleware.
//!
//! # Examples
//!
//! ```rust
//! use parafetch::http::{create_http_client, HttpClientConfig, RequestTimeouts};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::default()
//!     .with_timeouts(RequestTimeouts::new(Some(Duration::from_secs(60)), None));
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::{header::HeaderMap, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// Connect and total timeouts bounding one request. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestTimeouts {
    /// Maximum time to establish the connection.
    pub connect: Option<Duration>,
    /// Maximum time for the whole request, body included.
    pub total: Option<Duration>,
}

impl RequestTimeouts {
    pub fn new(connect: Option<Duration>, total: Option<Duration>) -> Self {
        Self { connect, total }
    }
}

/// Configuration for HTTP client setup.
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Timeouts applied to the client.
    pub timeouts: RequestTimeouts,
    /// Emit request/response spans through `reqwest-tracing`.
    pub trace_requests: bool,
}

impl HttpClientConfig {
    /// Returns a copy of this configuration with other timeouts.
    pub fn with_timeouts(mut self, timeouts: RequestTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// The inner reqwest client keeps no idle connections around, so a client
/// built for one attempt never hands its connection to another.
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut inner_client_builder = reqwest::Client::builder().pool_max_idle_per_host(0);

    if let Some(connect) = config.timeouts.connect {
        inner_client_builder = inner_client_builder.connect_timeout(connect);
    }
    if let Some(total) = config.timeouts.total {
        inner_client_builder = inner_client_builder.timeout(total);
    }

    // Configure proxy if provided
    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    // Configure default headers if provided
    if let Some(headers) = config.headers {
        inner_client_builder = inner_client_builder.default_headers(headers);
    }

    let inner_client = inner_client_builder.build()?;

    let mut builder = ClientBuilder::new(inner_client);
    if config.trace_requests {
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        builder = builder.with(TracingMiddleware::default());
    }

    Ok(builder.build())
}
