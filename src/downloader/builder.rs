//! Builder pattern implementation for creating Downloader instances.
//!
//! [`DownloaderBuilder`] collects the invocation parameters, validates them
//! and produces an immutable [`Downloader`].
//!
//! # Examples
//!
//! ```rust
//! use parafetch::DownloaderBuilder;
//! use reqwest::header::{HeaderValue, USER_AGENT};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), parafetch::Error> {
//! let downloader = DownloaderBuilder::new("out/blend.gz", "https://example.com/blend.gz")
//!     .max_threads(8)
//!     .retries(3)
//!     .retry_pause(Duration::from_secs(2))
//!     .connect_timeout(Some(Duration::from_secs(30)))
//!     .header(USER_AGENT, HeaderValue::from_static("parafetch"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::DownloadConfig, downloader::Downloader};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, HttpTransport, RequestTimeouts, Transport};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
pub struct DownloaderBuilder {
    outpath: PathBuf,
    url: String,
    etag: Option<String>,
    config: DownloadConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl DownloaderBuilder {
    /// Creates a builder downloading `url` to `outpath` with the default options.
    pub fn new(outpath: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            outpath: outpath.into(),
            url: url.into(),
            etag: None,
            config: DownloadConfig::default(),
            transport: None,
        }
    }

    /// Skip the download if the server reports this ETag.
    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: DownloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of concurrent segment workers.
    pub fn max_threads(mut self, max_threads: usize) -> Self {
        self.config.max_threads = max_threads;
        self
    }

    /// Set the total number of attempts for the probe and for each segment.
    pub fn retries(mut self, retries: usize) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set the pause between two attempts.
    pub fn retry_pause(mut self, pause: Duration) -> Self {
        self.config.retry_pause = pause;
        self
    }

    /// Set the limit for one whole segment request.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the limit for establishing a connection.
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the diagnostic verbosity, 0 to 3.
    pub fn debug_level(mut self, level: u8) -> Self {
        self.config.debug_level = level;
        self
    }

    /// Route every request through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be merged into a single one.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add the http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Use another transport instead of the reqwest-backed one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the options and create the [`Downloader`].
    pub fn build(self) -> Result<Downloader> {
        self.config.validate()?;
        let url = Url::parse(&self.url).map_err(|e| {
            Error::Config(format!("the url \"{}\" cannot be parsed: {}", self.url, e))
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(HttpClientConfig {
                proxy: self.config.proxy.clone(),
                headers: self.config.headers.clone(),
                timeouts: RequestTimeouts::default(),
                trace_requests: self.config.debug().logs_transport(),
            })),
        };

        Ok(Downloader::new(
            self.outpath,
            url,
            self.etag,
            self.config,
            transport,
        ))
    }
}
