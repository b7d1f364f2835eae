//! Download module containing the per-segment machinery.
//!
//! - [`segment`] - [`Segment`] and [`SegmentStatus`]
//! - [`plan`] - partitioning a resource into segments
//! - [`retry`] - the per-attempt retry state machine
//! - [`output`] - the pre-sized temporary file and its commit
//! - [`worker`] - the worker downloading one segment

pub mod output;
pub mod plan;
pub mod retry;
pub mod segment;
pub mod worker;

pub use output::{temp_path_for, TempFile, TEMP_SUFFIX};
pub use plan::{plan_segments, MIN_SEGMENT_LEN};
pub use retry::{is_retryable, AttemptOutcome, RetryPolicy, Step};
pub use segment::{Segment, SegmentStatus};
pub use worker::{SegmentWorker, WorkerContext};
