//! Segment planning.
//!
//! `[0, content_length)` is cut into contiguous segments. Up to `max_threads`
//! segments are used as long as each gets at least [`MIN_SEGMENT_LEN`] bytes;
//! smaller resources fall back to segments of exactly that floor so a few
//! megabytes never fan out into dozens of tiny requests. The last segment
//! always absorbs the remainder.

use super::segment::Segment;
use crate::error::{Error, Result};

/// Smallest segment length worth its own connection.
pub const MIN_SEGMENT_LEN: u64 = 1_000_000;

/// Partition `content_length` bytes into ordered, disjoint segments.
///
/// # Example
///
/// ```rust
/// use parafetch::download::plan_segments;
///
/// let lengths: Vec<u64> = plan_segments(2_500_000, 16)?
///     .iter()
///     .map(|s| s.length())
///     .collect();
/// assert_eq!(lengths, [1_000_000, 1_000_000, 500_000]);
/// # Ok::<(), parafetch::Error>(())
/// ```
pub fn plan_segments(content_length: u64, max_threads: usize) -> Result<Vec<Segment>> {
    if max_threads < 1 {
        return Err(Error::Config(format!(
            "max_threads must be at least 1, got {}",
            max_threads
        )));
    }
    if content_length == 0 {
        return Err(Error::PlanningAssertion(
            "cannot plan an empty resource".into(),
        ));
    }

    let candidate = content_length / max_threads as u64;
    let (segment_len, count) = if candidate >= MIN_SEGMENT_LEN {
        (candidate, max_threads as u64)
    } else {
        (MIN_SEGMENT_LEN, content_length.div_ceil(MIN_SEGMENT_LEN))
    };
    let count = usize::try_from(count)
        .map_err(|_| Error::Allocation(format!("{} segments do not fit in memory", count)))?;

    let mut segments = Vec::new();
    segments
        .try_reserve_exact(count)
        .map_err(|e| Error::Allocation(format!("cannot reserve {} segments: {}", count, e)))?;

    let mut offset = 0u64;
    for index in 0..count {
        let length = if index == count - 1 {
            content_length.checked_sub(offset).ok_or_else(|| {
                Error::PlanningAssertion(format!(
                    "offset {} overran content length {}",
                    offset, content_length
                ))
            })?
        } else {
            segment_len
        };
        if length == 0 {
            return Err(Error::PlanningAssertion(format!(
                "segment {} is empty",
                index
            )));
        }
        segments.push(Segment::new(index, offset, length));
        offset += length;
    }

    if offset != content_length {
        return Err(Error::PlanningAssertion(format!(
            "segments cover {} bytes, expected {}",
            offset, content_length
        )));
    }

    Ok(segments)
}
