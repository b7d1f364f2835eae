//! Per-attempt retry state machine.
//!
//! Each attempt of the probe or of a segment transfer ends in an
//! [`AttemptOutcome`]. Network-layer failures are retryable; local failures
//! (seek, write, session setup) are fatal for the attempt loop. The
//! [`RetryPolicy`] turns an outcome into the next [`Step`] without touching
//! any I/O, so the retry rules can be tested on their own.

use crate::error::{Error, ErrorCode, Result};
use std::time::Duration;

/// Whether a failure is worth another attempt.
pub fn is_retryable(err: &Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::Transport
            | ErrorCode::HttpStatus
            | ErrorCode::ByteCountMismatch
            | ErrorCode::ContentLength
    )
}

/// Classified result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T = ()> {
    Success(T),
    Retryable(Error),
    Fatal(Error),
}

impl<T> From<Result<T>> for AttemptOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) if is_retryable(&err) => AttemptOutcome::Retryable(err),
            Err(err) => AttemptOutcome::Fatal(err),
        }
    }
}

impl<T> AttemptOutcome<T> {
    /// The error of a failed attempt.
    pub fn error(&self) -> Option<&Error> {
        match self {
            AttemptOutcome::Success(_) => None,
            AttemptOutcome::Retryable(err) | AttemptOutcome::Fatal(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            AttemptOutcome::Success(value) => Ok(value),
            AttemptOutcome::Retryable(err) | AttemptOutcome::Fatal(err) => Err(err),
        }
    }
}

/// What to do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Pause, then make another attempt.
    Retry,
    /// Keep the outcome as final.
    Stop,
}

/// Fixed attempt budget with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: usize,
    pause: Duration,
}

impl RetryPolicy {
    /// `attempts` is the total number of attempts, the first one included.
    pub fn new(attempts: usize, pause: Duration) -> Self {
        Self { attempts, pause }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Decide the next step after attempt number `attempt` (0-based) ended with `outcome`.
    pub fn next_step<T>(&self, attempt: usize, outcome: &AttemptOutcome<T>) -> Step {
        match outcome {
            AttemptOutcome::Retryable(_) if attempt + 1 < self.attempts => Step::Retry,
            _ => Step::Stop,
        }
    }

    /// Sleep for the configured pause.
    pub async fn wait(&self) {
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
    }
}
