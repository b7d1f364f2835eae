//! Ranged request capability.
//!
//! [`Transport`] is the one seam between the engine and the network. A call
//! performs a single ranged `GET` and reports the status code, the response
//! headers and the body as a stream of [`Bytes`]. Callers decide what a good
//! answer is; the transport never interprets the status.

use super::client::{create_http_client, HttpClientConfig, RequestTimeouts};
use crate::error::{Error, Result};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{
    header::{HeaderMap, RANGE},
    StatusCode, Url,
};
use std::fmt;

/// Body of a ranged response.
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// An inclusive byte range, rendered as a `Range` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub first: u64,
    pub last: u64,
}

impl ByteRange {
    pub fn new(first: u64, last: u64) -> Self {
        Self { first, last }
    }

    /// The single-byte range used to learn the resource size.
    pub fn probe() -> Self {
        Self::new(0, 0)
    }

    /// The range covering `length` bytes starting at `start`. `length` must be positive.
    pub fn from_offset(start: u64, length: u64) -> Self {
        Self::new(start, start + length - 1)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes={}-{}", self.first, self.last)
    }
}

/// Status, headers and body of one ranged request.
pub struct RangeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl fmt::Debug for RangeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Issues one ranged HTTP request.
///
/// Each call is an independent session: implementations must not share a
/// connection between calls. Failing to set up the session is reported as
/// [`Error::Allocation`]; any network failure as [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_range(
        &self,
        url: &Url,
        range: ByteRange,
        timeouts: RequestTimeouts,
    ) -> Result<RangeResponse>;
}

/// [`Transport`] backed by reqwest, building a fresh client for every request.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    config: HttpClientConfig,
}

impl HttpTransport {
    pub fn new(config: HttpClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_range(
        &self,
        url: &Url,
        range: ByteRange,
        timeouts: RequestTimeouts,
    ) -> Result<RangeResponse> {
        let client = create_http_client(self.config.clone().with_timeouts(timeouts))
            .map_err(|e| Error::Allocation(format!("cannot create HTTP session: {}", e)))?;

        let res = client
            .get(url.clone())
            .header(RANGE, range.to_string())
            .send()
            .await?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed();

        Ok(RangeResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_range_display() {
        assert_eq!(ByteRange::probe().to_string(), "bytes=0-0");
        assert_eq!(
            ByteRange::from_offset(1_000_000, 500_000).to_string(),
            "bytes=1000000-1499999"
        );
    }
}
