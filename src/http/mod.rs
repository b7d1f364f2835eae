//! HTTP module containing the transport capability used by the engine.
//!
//! The engine only ever needs one kind of request: a ranged `GET` whose status,
//! headers and body stream are handed back untouched. That capability is the
//! [`Transport`] trait; [`HttpTransport`] implements it on top of reqwest.
//!
//! # Overview
//!
//! - [`client`] - HTTP client creation and middleware configuration
//! - [`transport`] - the [`Transport`] trait, [`ByteRange`] and [`RangeResponse`]
//!
//! # Examples
//!
//! ```rust
//! use parafetch::http::{ByteRange, HttpClientConfig, HttpTransport};
//!
//! let transport = HttpTransport::new(HttpClientConfig::default());
//! assert_eq!(ByteRange::new(0, 1023).to_string(), "bytes=0-1023");
//! # let _ = transport;
//! ```

pub mod client;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig, RequestTimeouts};
pub use transport::{BodyStream, ByteRange, HttpTransport, RangeResponse, Transport};
