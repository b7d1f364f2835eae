//! Configuration structures and defaults for the downloader.
//!
//! [`DownloadConfig`] carries every knob of one invocation except the output
//! path, URL and expected ETag. The defaults are 16 workers, 5 attempts with a
//! 5 second pause between them, no overall request timeout and a 60 second
//! connect timeout.
//!
//! # Examples
//!
//! ```rust
//! use parafetch::downloader::DownloadConfig;
//! use std::time::Duration;
//!
//! // Seconds-based form; 0 means "no limit" for both timeouts.
//! let config = DownloadConfig::from_secs(4, 3, 1, 0, 30, 1);
//! assert_eq!(config.max_threads, 4);
//! assert_eq!(config.timeout, None);
//! assert_eq!(config.connect_timeout, Some(Duration::from_secs(30)));
//! ```

use crate::download::RetryPolicy;
use crate::error::{Error, Result};
use crate::http::RequestTimeouts;

use reqwest::header::HeaderMap;
use std::fmt;
use std::time::Duration;

/// Verbosity of the engine's own diagnostic events, from 0 (silent) to 3.
///
/// - `1`: start line, retries and completed segments.
/// - `2`: segment plan, probe results, per-attempt HTTP status.
/// - `3`: request-level tracing from the HTTP middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DebugLevel(u8);

impl DebugLevel {
    pub const MAX: u8 = 3;

    /// Returns `None` for levels above [`DebugLevel::MAX`].
    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn logs_progress(self) -> bool {
        self.0 >= 1
    }

    pub fn logs_details(self) -> bool {
        self.0 >= 2
    }

    pub fn logs_transport(self) -> bool {
        self.0 >= 3
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Configuration of one download invocation.
#[derive(Clone, Debug)]
pub struct DownloadConfig {
    /// Maximum number of concurrent segment workers.
    pub max_threads: usize,
    /// Total attempts for the probe and for each segment.
    pub retries: usize,
    /// Pause between two attempts.
    pub retry_pause: Duration,
    /// Limit for a whole segment request. `None` means unlimited.
    pub timeout: Option<Duration>,
    /// Limit for establishing a connection. `None` means unlimited.
    pub connect_timeout: Option<Duration>,
    /// Diagnostic verbosity, 0 to 3.
    pub debug_level: u8,
    /// Extra headers sent with every request.
    pub headers: Option<HeaderMap>,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_threads: 16,
            retries: 5,
            retry_pause: Duration::from_secs(5),
            timeout: None,
            connect_timeout: Some(Duration::from_secs(60)),
            debug_level: 0,
            headers: None,
            proxy: None,
        }
    }
}

fn secs(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}

impl DownloadConfig {
    /// Build a configuration from whole seconds, where a timeout of 0 means unlimited.
    pub fn from_secs(
        max_threads: usize,
        retries: usize,
        retry_pause: u64,
        timeout: u64,
        connect_timeout: u64,
        debug_level: u8,
    ) -> Self {
        Self {
            max_threads,
            retries,
            retry_pause: Duration::from_secs(retry_pause),
            timeout: secs(timeout),
            connect_timeout: secs(connect_timeout),
            debug_level,
            ..Default::default()
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_threads < 1 {
            return Err(Error::Config(format!(
                "max_threads must be at least 1, got {}",
                self.max_threads
            )));
        }
        if self.retries < 1 {
            return Err(Error::Config(format!(
                "retries must be at least 1, got {}",
                self.retries
            )));
        }
        if DebugLevel::new(self.debug_level).is_none() {
            return Err(Error::Config(format!(
                "debug level must be between 0 and {}, got {}",
                DebugLevel::MAX,
                self.debug_level
            )));
        }
        Ok(())
    }

    pub fn debug(&self) -> DebugLevel {
        DebugLevel::new(self.debug_level).unwrap_or(DebugLevel(DebugLevel::MAX))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_pause)
    }

    /// Timeouts of the probe: the connect timeout bounds the whole request.
    pub fn probe_timeouts(&self) -> RequestTimeouts {
        RequestTimeouts::new(self.connect_timeout, self.connect_timeout)
    }

    /// Timeouts of a segment request.
    pub fn segment_timeouts(&self) -> RequestTimeouts {
        RequestTimeouts::new(self.connect_timeout, self.timeout)
    }
}
