//! Parafetch downloads one large HTTP(S) resource by splitting it into byte
//! ranges fetched concurrently, then commits the result to the output path in
//! a single rename.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use parafetch::DownloaderBuilder;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), parafetch::Error> {
//! let done = DownloaderBuilder::new("blend.gz", "https://example.com/blend.gz")
//!     .max_threads(8)
//!     .build()?
//!     .download()
//!     .await?;
//! println!("{} bytes, etag {:?}", done.content_length, done.etag);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - segments, planning, retry state machine, temporary file and segment worker
//! - [`downloader`] - the coordinator, its builder and configuration, and the prober
//! - [`error`] - the [`Error`] enum and stable [`ErrorCode`]s
//! - [`http`] - the ranged request [`Transport`] and its reqwest implementation
//! - [`utils`] - probe header parsing

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod utils;

pub use download::{plan_segments, Segment, SegmentStatus};
pub use downloader::{
    download, DebugLevel, DownloadConfig, Downloaded, Downloader, DownloaderBuilder,
};
pub use error::{Error, ErrorCode, Result};
pub use http::{create_http_client, HttpClientConfig, HttpTransport, Transport};
pub use utils::{parse_etag, parse_probe_content_range};
