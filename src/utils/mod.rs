//! Shared utility functions.
//!
//! - [`headers`] - `Content-Range` and `ETag` parsing for the probe request

pub mod headers;

pub use headers::{parse_etag, parse_probe_content_range, probe_headers};
