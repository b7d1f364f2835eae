//! Error handling for parafetch.
//!
//! Every failure a download can end with maps onto one stable [`ErrorCode`].
//! The [`Error`] enum carries the context (paths, segment index, HTTP status,
//! underlying I/O or transport error) while the code and its fixed message are
//! what callers are expected to branch on.

use reqwest::StatusCode;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used for transport failures of any origin.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stable, caller-visible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Allocation,
    PlanningAssertion,
    ContentLength,
    Config,
    HttpStatus,
    Open,
    Seek,
    Close,
    ByteCountMismatch,
    WorkerSpawn,
    WorkerJoin,
    Rename,
    ETagMatch,
    Transport,
    Write,
}

impl ErrorCode {
    /// Every code, in table order.
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::Allocation,
        ErrorCode::PlanningAssertion,
        ErrorCode::ContentLength,
        ErrorCode::Config,
        ErrorCode::HttpStatus,
        ErrorCode::Open,
        ErrorCode::Seek,
        ErrorCode::Close,
        ErrorCode::ByteCountMismatch,
        ErrorCode::WorkerSpawn,
        ErrorCode::WorkerJoin,
        ErrorCode::Rename,
        ErrorCode::ETagMatch,
        ErrorCode::Transport,
        ErrorCode::Write,
    ];

    /// The stable name of the code.
    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::Allocation => "AllocationError",
            ErrorCode::PlanningAssertion => "PlanningAssertionError",
            ErrorCode::ContentLength => "ContentLengthError",
            ErrorCode::Config => "ConfigError",
            ErrorCode::HttpStatus => "HttpStatusError",
            ErrorCode::Open => "OpenError",
            ErrorCode::Seek => "SeekError",
            ErrorCode::Close => "CloseError",
            ErrorCode::ByteCountMismatch => "ByteCountMismatchError",
            ErrorCode::WorkerSpawn => "WorkerSpawnError",
            ErrorCode::WorkerJoin => "WorkerJoinError",
            ErrorCode::Rename => "RenameError",
            ErrorCode::ETagMatch => "ETagMatchError",
            ErrorCode::Transport => "TransportError",
            ErrorCode::Write => "WriteError",
        }
    }

    /// The fixed human-readable message for the code.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::Allocation => "memory allocation failure",
            ErrorCode::PlanningAssertion => "assertion failed",
            ErrorCode::ContentLength => "content-length is undefined or 0",
            ErrorCode::Config => "bad configuration value",
            ErrorCode::HttpStatus => "bad HTTP status code",
            ErrorCode::Open => "error opening output file",
            ErrorCode::Seek => "error seeking on output file",
            ErrorCode::Close => "error closing output file",
            ErrorCode::ByteCountMismatch => "wrong number of bytes written to file segment",
            ErrorCode::WorkerSpawn => "error creating worker",
            ErrorCode::WorkerJoin => "error joining worker",
            ErrorCode::Rename => "error renaming output file",
            ErrorCode::ETagMatch => "ETag match, not downloaded",
            ErrorCode::Transport => "transport failure",
            ErrorCode::Write => "error writing output file",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name(), self.message())
    }
}

/// Errors that can happen while downloading.
#[derive(Error, Debug)]
pub enum Error {
    /// A transport session or the segment table could not be allocated.
    #[error("Allocation error: {0}")]
    Allocation(String),

    /// The segment plan violated its own invariants. This is a bug.
    #[error("Planning assertion failed: {0}")]
    PlanningAssertion(String),

    /// The probe never resolved a usable content length.
    #[error("Content-length is undefined or 0")]
    ContentLength,

    /// An invocation parameter is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A request did not answer with 206 Partial Content.
    #[error("Bad HTTP status code: expected 206 Partial Content, got {status}")]
    HttpStatus { status: StatusCode },

    /// The output or temporary file could not be opened.
    #[error("Error opening {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A seek did not land on the requested offset.
    #[error("Error seeking {path:?} to offset {offset}")]
    Seek {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// A file handle could not be flushed and closed.
    #[error("Error closing {path:?}")]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A segment received a different number of bytes than planned.
    #[error("Segment {index}: wrote {written} bytes, expected {expected}")]
    ByteCountMismatch {
        index: usize,
        written: u64,
        expected: u64,
    },

    /// A worker could not be started.
    #[error("Error spawning worker: {0}")]
    WorkerSpawn(String),

    /// A worker could not be awaited (it panicked or was cancelled).
    #[error("Error joining worker for segment {index}")]
    WorkerJoin {
        index: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    /// The temporary file could not be moved to the final path.
    #[error("Error renaming {from:?} to {to:?}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The server ETag equals the expected one; nothing was downloaded.
    #[error("ETag match, not downloaded: {etag}")]
    ETagMatch { etag: String },

    /// The request could not be completed (connect, DNS, timeout, reset).
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: BoxError,
    },

    /// Writing a segment into the temporary file failed.
    #[error("Error writing segment {index} to {path:?}")]
    Write {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Wraps any error as a transport failure.
    pub fn transport<E: Into<BoxError>>(err: E) -> Self {
        Error::Transport { source: err.into() }
    }

    /// The stable code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Allocation(_) => ErrorCode::Allocation,
            Error::PlanningAssertion(_) => ErrorCode::PlanningAssertion,
            Error::ContentLength => ErrorCode::ContentLength,
            Error::Config(_) => ErrorCode::Config,
            Error::HttpStatus { .. } => ErrorCode::HttpStatus,
            Error::Open { .. } => ErrorCode::Open,
            Error::Seek { .. } => ErrorCode::Seek,
            Error::Close { .. } => ErrorCode::Close,
            Error::ByteCountMismatch { .. } => ErrorCode::ByteCountMismatch,
            Error::WorkerSpawn(_) => ErrorCode::WorkerSpawn,
            Error::WorkerJoin { .. } => ErrorCode::WorkerJoin,
            Error::Rename { .. } => ErrorCode::Rename,
            Error::ETagMatch { .. } => ErrorCode::ETagMatch,
            Error::Transport { .. } => ErrorCode::Transport,
            Error::Write { .. } => ErrorCode::Write,
        }
    }

    /// Whether this is the "resource unchanged" sentinel rather than a failure.
    pub fn is_etag_match(&self) -> bool {
        matches!(self, Error::ETagMatch { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::transport(source)
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(source: reqwest_middleware::Error) -> Self {
        Error::transport(source)
    }
}

/// Result type alias for operations that can fail with a parafetch error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_names_are_unique() {
        let names: HashSet<_> = ErrorCode::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn test_code_display() {
        assert_eq!(
            ErrorCode::HttpStatus.to_string(),
            "HttpStatusError : bad HTTP status code"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::ContentLength.code(), ErrorCode::ContentLength);
        assert_eq!(
            Error::HttpStatus {
                status: StatusCode::OK
            }
            .code(),
            ErrorCode::HttpStatus
        );
        assert_eq!(
            Error::transport("connection reset").code(),
            ErrorCode::Transport
        );
    }

    #[test]
    fn test_etag_match_is_sentinel() {
        let err = Error::ETagMatch {
            etag: "abc".into(),
        };
        assert!(err.is_etag_match());
        assert!(!Error::ContentLength.is_etag_match());
    }
}
