//! Tests for the coordinator driven by an in-memory transport.

use parafetch::http::{ByteRange, RangeResponse, RequestTimeouts};
use parafetch::{DownloaderBuilder, Error, ErrorCode, Transport};
use reqwest::{StatusCode, Url};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::helpers::*;

const URL: &str = "http://origin.test/blend.gz";

fn builder(transport: Arc<ScriptedTransport>, outpath: &std::path::Path) -> DownloaderBuilder {
    DownloaderBuilder::new(outpath, URL)
        .retry_pause(Duration::ZERO)
        .transport(transport)
}

#[tokio::test]
async fn test_success_with_scripted_transport() {
    let content = create_test_content(32_000_000);
    let transport = Arc::new(ScriptedTransport::new(content.clone(), Some("v1")));

    let dir = create_temp_dir();
    let outpath = dir.path().join("blend.gz");
    let done = builder(transport.clone(), &outpath)
        .max_threads(4)
        .build()
        .unwrap()
        .download()
        .await
        .unwrap();

    assert_eq!(done.content_length, 32_000_000);
    assert_eq!(done.etag.as_deref(), Some("v1"));
    assert_eq!(fs::read(&outpath).unwrap(), content);
    for start in [0, 8_000_000, 16_000_000, 24_000_000] {
        assert_eq!(transport.requests_at(start), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_segment_recovers_on_third_attempt() {
    let content = create_test_content(2_500_000);
    let transport = Arc::new(
        ScriptedTransport::new(content.clone(), None).script(
            1_000_000,
            vec![Reply::Reset, Reply::Status(StatusCode::BAD_GATEWAY)],
        ),
    );

    let dir = create_temp_dir();
    let outpath = dir.path().join("blend.gz");
    builder(transport.clone(), &outpath)
        .retries(5)
        .build()
        .unwrap()
        .download()
        .await
        .unwrap();

    assert_eq!(transport.requests_at(0), 1);
    assert_eq!(transport.requests_at(1_000_000), 3);
    assert_eq!(transport.requests_at(2_000_000), 1);
    assert_eq!(fs::read(&outpath).unwrap(), content);
}

#[tokio::test]
async fn test_first_failing_segment_wins() {
    let content = create_test_content(2_500_000);
    let transport = Arc::new(
        ScriptedTransport::new(content, None)
            .script(0, vec![Reply::Reset, Reply::Reset])
            .script(
                2_000_000,
                vec![
                    Reply::Status(StatusCode::FORBIDDEN),
                    Reply::Status(StatusCode::FORBIDDEN),
                ],
            ),
    );

    let dir = create_temp_dir();
    let outpath = dir.path().join("blend.gz");
    let err = builder(transport.clone(), &outpath)
        .retries(2)
        .build()
        .unwrap()
        .download()
        .await
        .unwrap_err();

    // Segment 0 precedes segment 2, whatever order they finished in.
    assert_eq!(err.code(), ErrorCode::Transport);
    // Every worker ran to exhaustion; none was cancelled.
    assert_eq!(transport.requests_at(0), 2);
    assert_eq!(transport.requests_at(1_000_000), 1);
    assert_eq!(transport.requests_at(2_000_000), 2);
    assert!(list_dir(dir.path()).is_empty());
}

#[tokio::test]
async fn test_probe_failure_creates_no_file() {
    let dir = create_temp_dir();
    let outpath = dir.path().join("blend.gz");
    let err = DownloaderBuilder::new(&outpath, URL)
        .retries(2)
        .retry_pause(Duration::ZERO)
        .transport(Arc::new(Unreachable))
        .build()
        .unwrap()
        .download()
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Transport);
    assert!(list_dir(dir.path()).is_empty());
}

/// An origin that can never be reached.
struct Unreachable;

#[async_trait::async_trait]
impl Transport for Unreachable {
    async fn get_range(
        &self,
        _url: &Url,
        _range: ByteRange,
        _timeouts: RequestTimeouts,
    ) -> parafetch::Result<RangeResponse> {
        Err(Error::transport("could not resolve host"))
    }
}

/// Serves the resource but crashes the worker fetching the range at `first`.
struct CrashesAt {
    first: u64,
    inner: ScriptedTransport,
}

#[async_trait::async_trait]
impl Transport for CrashesAt {
    async fn get_range(
        &self,
        url: &Url,
        range: ByteRange,
        timeouts: RequestTimeouts,
    ) -> parafetch::Result<RangeResponse> {
        if range.first == self.first {
            panic!("worker crashed fetching {}", range);
        }
        self.inner.get_range(url, range, timeouts).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_crashed_worker_is_join_error() {
    let transport = CrashesAt {
        first: 1_000_000,
        inner: ScriptedTransport::new(create_test_content(2_500_000), None),
    };

    let dir = create_temp_dir();
    let outpath = dir.path().join("blend.gz");
    let err = DownloaderBuilder::new(&outpath, URL)
        .retry_pause(Duration::ZERO)
        .transport(Arc::new(transport))
        .build()
        .unwrap()
        .download()
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::WorkerJoin);
    assert!(list_dir(dir.path()).is_empty());
}

#[test]
fn test_builder_getters() {
    let downloader = DownloaderBuilder::new("out.bin", URL)
        .etag("v1")
        .max_threads(4)
        .retries(3)
        .retry_pause(Duration::from_secs(2))
        .timeout(Some(Duration::from_secs(600)))
        .connect_timeout(None)
        .debug_level(3)
        .build()
        .unwrap();

    assert_eq!(downloader.etag(), Some("v1"));
    assert_eq!(downloader.url().as_str(), URL);
    let config = downloader.config();
    assert_eq!(config.max_threads, 4);
    assert_eq!(config.retries, 3);
    assert_eq!(config.retry_pause, Duration::from_secs(2));
    assert_eq!(config.timeout, Some(Duration::from_secs(600)));
    assert_eq!(config.connect_timeout, None);
    assert!(config.debug().logs_transport());
}

#[test]
fn test_builder_rejects_invalid_values() {
    for builder in [
        DownloaderBuilder::new("out.bin", URL).max_threads(0),
        DownloaderBuilder::new("out.bin", URL).retries(0),
        DownloaderBuilder::new("out.bin", URL).debug_level(7),
        DownloaderBuilder::new("out.bin", "::not a url::"),
    ] {
        assert_eq!(builder.build().unwrap_err().code(), ErrorCode::Config);
    }
}

#[test]
fn test_downloader_debug() {
    let downloader = DownloaderBuilder::new("out.bin", URL).build().unwrap();
    let debug_str = format!("{:?}", downloader);

    assert!(debug_str.contains("Downloader"));
    assert!(debug_str.contains("config"));
}
