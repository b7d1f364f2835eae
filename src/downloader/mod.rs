//! Downloader module containing the coordinator, its builder and configuration.
//!
//! - `downloader` - the [`Downloader`] coordinator and its [`Phase`]s
//! - `builder` - [`DownloaderBuilder`] for configuring an invocation
//! - `config` - [`DownloadConfig`] defaults and [`DebugLevel`]
//! - `probe` - the [`Prober`] learning size and ETag of the resource
//!
//! # Examples
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), parafetch::Error> {
//! let done = parafetch::download("blend.gz", "https://example.com/blend.gz").await?;
//! println!("downloaded {} bytes", done.content_length);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;
pub mod probe;

pub use builder::DownloaderBuilder;
pub use config::{DebugLevel, DownloadConfig};
pub use downloader::{Downloaded, Downloader, Phase};
pub use probe::{ProbeResult, Prober};

use crate::error::Result;
use std::path::PathBuf;

/// Download `url` to `outpath` with the default options.
pub async fn download(outpath: impl Into<PathBuf>, url: impl Into<String>) -> Result<Downloaded> {
    DownloaderBuilder::new(outpath, url).build()?.download().await
}
