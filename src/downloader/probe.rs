//! Resource probing.
//!
//! The [`Prober`] learns the total size and entity tag of the resource with a
//! `bytes=0-0` request. Only the headers are looked at; the body is dropped
//! unread.

use super::config::DebugLevel;
use crate::download::{AttemptOutcome, RetryPolicy, Step};
use crate::error::{Error, Result};
use crate::http::{ByteRange, RequestTimeouts, Transport};
use crate::utils::probe_headers;

use reqwest::{StatusCode, Url};
use tracing::debug;

/// Size and version of the remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Total size in bytes, always positive.
    pub content_length: u64,
    /// Server entity tag without its quotes.
    pub etag: Option<String>,
}

/// Issues the probe request, retrying per the policy.
pub struct Prober<'a> {
    transport: &'a dyn Transport,
    url: &'a Url,
    timeouts: RequestTimeouts,
    policy: RetryPolicy,
    debug: DebugLevel,
}

impl<'a> Prober<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        url: &'a Url,
        timeouts: RequestTimeouts,
        policy: RetryPolicy,
        debug: DebugLevel,
    ) -> Self {
        Self {
            transport,
            url,
            timeouts,
            policy,
            debug,
        }
    }

    /// Probe the resource.
    ///
    /// Transport failures, non-206 answers and a missing or zero length are
    /// retried; once the attempts run out the last of these errors is returned.
    pub async fn probe(&self) -> Result<ProbeResult> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                self.policy.wait().await;
            }

            let outcome = AttemptOutcome::from(self.attempt().await);
            match self.policy.next_step(attempt, &outcome) {
                Step::Retry => {
                    if self.debug.logs_progress() {
                        if let Some(err) = outcome.error() {
                            debug!(
                                "Probe retry {}/{} after: {}",
                                attempt + 2,
                                self.policy.attempts(),
                                err
                            );
                        }
                    }
                    attempt += 1;
                }
                Step::Stop => return outcome.into_result(),
            }
        }
    }

    async fn attempt(&self) -> Result<ProbeResult> {
        let response = self
            .transport
            .get_range(self.url, ByteRange::probe(), self.timeouts)
            .await?;
        let status = response.status;
        let (content_length, etag) = probe_headers(&response.headers);
        drop(response);

        if self.debug.logs_details() {
            debug!(
                "Probe: HTTP response code {}, content_len={}, etag={}",
                status,
                content_length,
                etag.as_deref().unwrap_or("NULL")
            );
        }

        if status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::HttpStatus { status });
        }
        if content_length == 0 {
            return Err(Error::ContentLength);
        }
        Ok(ProbeResult {
            content_length,
            etag,
        })
    }
}
