//! Download coordinator.
//!
//! [`Downloader::download`] runs one invocation through its phases:
//!
//! 1. probe the resource for its size and ETag,
//! 2. stop with [`Error::ETagMatch`] if the caller already has that version,
//! 3. create the pre-sized temporary file,
//! 4. plan the segments,
//! 5. run one worker per segment and wait for all of them,
//! 6. rename the temporary file over the output path.
//!
//! Any failure removes the temporary file and leaves the output path alone.
//!
//! # Examples
//!
//! ```rust,no_run
//! use parafetch::DownloaderBuilder;
//!
//! # async fn example() -> Result<(), parafetch::Error> {
//! let downloader = DownloaderBuilder::new("blend.gz", "https://example.com/blend.gz")
//!     .max_threads(4)
//!     .retries(4)
//!     .etag("779ccf330e7c227ebbf7b34f0a6bae79")
//!     .build()?;
//!
//! match downloader.download().await {
//!     Ok(done) => println!("{} bytes, etag {:?}", done.content_length, done.etag),
//!     Err(e) if e.is_etag_match() => println!("unchanged"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use super::config::DownloadConfig;
use super::probe::{ProbeResult, Prober};
use crate::download::{
    plan_segments, Segment, SegmentStatus, SegmentWorker, TempFile, WorkerContext,
};
use crate::error::{Error, Result};
use crate::http::Transport;

use futures::future::join_all;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinError;
use tracing::{debug, trace};

/// Coordinator phases, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Probing,
    SkipCheck,
    Preparing,
    Planning,
    Downloading,
    Committing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Probing => "probing",
            Phase::SkipCheck => "skip-check",
            Phase::Preparing => "preparing",
            Phase::Planning => "planning",
            Phase::Downloading => "downloading",
            Phase::Committing => "committing",
        };
        f.write_str(name)
    }
}

/// Result of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    /// Size of the downloaded resource in bytes.
    pub content_length: u64,
    /// Server entity tag, if it sent one.
    pub etag: Option<String>,
}

/// Represents one download invocation.
///
/// A downloader is created via its builder:
///
/// ```rust
/// use parafetch::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new("out.bin", "https://example.com/file.bin")
///     .build()
///     .unwrap();
/// assert_eq!(d.config().max_threads, 16);
/// ```
#[derive(Clone)]
pub struct Downloader {
    outpath: PathBuf,
    url: Url,
    etag: Option<String>,
    config: DownloadConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("outpath", &self.outpath)
            .field("url", &self.url.as_str())
            .field("etag", &self.etag)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    pub(crate) fn new(
        outpath: PathBuf,
        url: Url,
        etag: Option<String>,
        config: DownloadConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            outpath,
            url,
            etag,
            config,
            transport,
        }
    }

    /// Final output path.
    pub fn outpath(&self) -> &Path {
        &self.outpath
    }

    /// Source URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// ETag of the version the caller already has.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download the resource to the output path.
    pub async fn download(&self) -> Result<Downloaded> {
        let debug_level = self.config.debug();

        trace!(phase = %Phase::Probing);
        let probe = Prober::new(
            self.transport.as_ref(),
            &self.url,
            self.config.probe_timeouts(),
            self.config.retry_policy(),
            debug_level,
        )
        .probe()
        .await?;

        trace!(phase = %Phase::SkipCheck);
        self.skip_check(&probe)?;

        trace!(phase = %Phase::Preparing);
        let temp = TempFile::prepare(&self.outpath, probe.content_length).await?;
        if debug_level.logs_details() {
            debug!("outpath_tmp={:?}", temp.path());
        }

        trace!(phase = %Phase::Planning);
        let segments = plan_segments(probe.content_length, self.config.max_threads)?;
        if debug_level.logs_details() {
            for segment in &segments {
                debug!(
                    "SEG[{}] off={} len={}",
                    segment.index(),
                    segment.start_offset(),
                    segment.length()
                );
            }
        }

        trace!(phase = %Phase::Downloading);
        if debug_level.logs_progress() {
            debug!("GET {}", self.url);
        }
        self.run_workers(segments, temp.path()).await?;

        trace!(phase = %Phase::Committing);
        temp.commit(&self.outpath).await?;

        Ok(Downloaded {
            content_length: probe.content_length,
            etag: probe.etag,
        })
    }

    fn skip_check(&self, probe: &ProbeResult) -> Result<()> {
        match (&self.etag, &probe.etag) {
            (Some(expected), Some(server)) if expected == server => Err(Error::ETagMatch {
                etag: server.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Spawn one worker per segment and wait for every one of them.
    async fn run_workers(&self, segments: Vec<Segment>, temp_path: &Path) -> Result<Vec<Segment>> {
        let handle = Handle::try_current().map_err(|e| Error::WorkerSpawn(e.to_string()))?;
        let ctx = Arc::new(WorkerContext {
            url: self.url.clone(),
            temp_path: temp_path.to_path_buf(),
            policy: self.config.retry_policy(),
            timeouts: self.config.segment_timeouts(),
            debug: self.config.debug(),
            transport: Arc::clone(&self.transport),
        });

        let workers = segments.into_iter().map(|segment| {
            let index = segment.index();
            let task = handle.spawn(SegmentWorker::new(segment, Arc::clone(&ctx)).run());
            async move { (index, task.await) }
        });
        let finished = join_all(workers).await;

        first_failure(finished)
    }
}

/// Adopt the first failure in segment order, or return every segment.
fn first_failure(
    finished: Vec<(usize, std::result::Result<Segment, JoinError>)>,
) -> Result<Vec<Segment>> {
    let mut segments = Vec::with_capacity(finished.len());
    for (index, joined) in finished {
        let segment = joined.map_err(|source| Error::WorkerJoin { index, source })?;
        if !segment.status().is_success() {
            return Err(match segment.into_status() {
                SegmentStatus::Failed(err) => err,
                _ => Error::PlanningAssertion(format!("segment {} never ran", index)),
            });
        }
        segments.push(segment);
    }
    Ok(segments)
}
