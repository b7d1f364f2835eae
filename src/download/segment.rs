//! Segment bookkeeping.
//!
//! A [`Segment`] is one disjoint byte range of the resource. It is created by
//! the planner, then moved into exactly one worker, which is the only code that
//! mutates it until it is handed back to the coordinator.

use crate::error::Error;
use crate::http::ByteRange;

/// Outcome of a segment.
#[derive(Debug, Default)]
pub enum SegmentStatus {
    /// Not run yet.
    #[default]
    Pending,
    /// Every byte of the range was written and validated.
    Success,
    /// The last error observed by the worker.
    Failed(Error),
}

impl SegmentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SegmentStatus::Success)
    }
}

/// A byte range of the output file owned by one worker.
#[derive(Debug)]
pub struct Segment {
    index: usize,
    start_offset: u64,
    length: u64,
    bytes_written: u64,
    attempts: usize,
    status: SegmentStatus,
}

impl Segment {
    pub fn new(index: usize, start_offset: u64, length: u64) -> Self {
        Self {
            index,
            start_offset,
            length,
            bytes_written: 0,
            attempts: 0,
            status: SegmentStatus::Pending,
        }
    }

    /// Position of the segment in the plan.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// One past the last byte of the segment.
    pub fn end_offset(&self) -> u64 {
        self.start_offset + self.length
    }

    /// Bytes written during the current (or last) attempt.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Number of transfer attempts made so far.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn status(&self) -> &SegmentStatus {
        &self.status
    }

    /// The `Range` this segment requests.
    pub fn range(&self) -> ByteRange {
        ByteRange::from_offset(self.start_offset, self.length)
    }

    /// Bytes still missing from the range.
    pub fn remaining(&self) -> u64 {
        self.length - self.bytes_written
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.bytes_written = 0;
        self.attempts += 1;
    }

    pub(crate) fn record_written(&mut self, n: u64) {
        self.bytes_written += n;
    }

    pub(crate) fn set_status(&mut self, status: SegmentStatus) {
        self.status = status;
    }

    /// Consumes the segment, returning its status.
    pub fn into_status(self) -> SegmentStatus {
        self.status
    }
}
