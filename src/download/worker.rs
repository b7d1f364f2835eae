//! Segment worker.
//!
//! A [`SegmentWorker`] owns one [`Segment`], one write handle on the temporary
//! file and, per attempt, one transport session. Each attempt seeks to the
//! segment start, requests the segment range and streams the body into the
//! file, never writing past the end of the segment. The attempt then has to
//! show a 206 status and exactly the planned byte count.
//!
//! Local failures (seek, write) end the worker at once; network-level ones are
//! retried according to the [`RetryPolicy`].

use super::output::{close_file, seek_exact};
use super::retry::{AttemptOutcome, RetryPolicy, Step};
use super::segment::{Segment, SegmentStatus};
use crate::downloader::DebugLevel;
use crate::error::{Error, Result};
use crate::http::{RequestTimeouts, Transport};

use futures::StreamExt;
use reqwest::{StatusCode, Url};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
};
use tracing::debug;

/// Read-only state shared by every worker of one invocation.
pub struct WorkerContext {
    pub url: Url,
    pub temp_path: PathBuf,
    pub policy: RetryPolicy,
    pub timeouts: RequestTimeouts,
    pub debug: DebugLevel,
    pub transport: Arc<dyn Transport>,
}

/// Downloads one segment into the temporary file.
pub struct SegmentWorker {
    segment: Segment,
    ctx: Arc<WorkerContext>,
}

impl SegmentWorker {
    pub fn new(segment: Segment, ctx: Arc<WorkerContext>) -> Self {
        Self { segment, ctx }
    }

    /// Run the worker to completion and hand the segment back with its status set.
    pub async fn run(mut self) -> Segment {
        let ctx = Arc::clone(&self.ctx);

        let mut file = match OpenOptions::new().write(true).open(&ctx.temp_path).await {
            Ok(file) => file,
            Err(source) => {
                self.segment.set_status(SegmentStatus::Failed(Error::Open {
                    path: ctx.temp_path.clone(),
                    source,
                }));
                return self.segment;
            }
        };

        let mut attempt = 0;
        let outcome = loop {
            if attempt > 0 {
                ctx.policy.wait().await;
            }
            self.segment.begin_attempt();

            let outcome = AttemptOutcome::from(self.attempt(&mut file).await);
            match ctx.policy.next_step(attempt, &outcome) {
                Step::Retry => {
                    if ctx.debug.logs_progress() {
                        if let Some(err) = outcome.error() {
                            debug!(
                                segment = self.segment.index(),
                                "Retry {}/{} after: {}",
                                attempt + 2,
                                ctx.policy.attempts(),
                                err
                            );
                        }
                    }
                    attempt += 1;
                }
                Step::Stop => break outcome,
            }
        };

        let mut status = match outcome.into_result() {
            Ok(()) => {
                if ctx.debug.logs_progress() {
                    debug!(
                        segment = self.segment.index(),
                        "Wrote {}-{}",
                        self.segment.start_offset(),
                        self.segment.end_offset() - 1
                    );
                }
                SegmentStatus::Success
            }
            Err(err) => SegmentStatus::Failed(err),
        };

        if let Err(err) = close_file(file, &ctx.temp_path).await {
            status = SegmentStatus::Failed(err);
        }
        self.segment.set_status(status);
        self.segment
    }

    async fn attempt(&mut self, file: &mut File) -> Result<()> {
        let ctx = &self.ctx;
        let segment = &mut self.segment;

        seek_exact(file, &ctx.temp_path, segment.start_offset()).await?;

        let response = ctx
            .transport
            .get_range(&ctx.url, segment.range(), ctx.timeouts)
            .await?;
        if ctx.debug.logs_details() {
            debug!(
                segment = segment.index(),
                "HTTP response code {}", response.status
            );
        }
        if response.status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::HttpStatus {
                status: response.status,
            });
        }

        let mut body = response.body;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            // Never write past the segment, even if the server ignored the range.
            let remaining = usize::try_from(segment.remaining()).unwrap_or(usize::MAX);
            let take = chunk.len().min(remaining);
            file.write_all(&chunk[..take])
                .await
                .map_err(|source| Error::Write {
                    index: segment.index(),
                    path: ctx.temp_path.clone(),
                    source,
                })?;
            segment.record_written(take as u64);
            if take < chunk.len() {
                break;
            }
        }

        if segment.bytes_written() != segment.length() {
            return Err(Error::ByteCountMismatch {
                index: segment.index(),
                written: segment.bytes_written(),
                expected: segment.length(),
            });
        }
        Ok(())
    }
}
