use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use mockito::{Mock, ServerGuard};
use parafetch::http::{ByteRange, RangeResponse, RequestTimeouts, Transport};
use parafetch::{DownloaderBuilder, Error, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_RANGE, ETAG},
    StatusCode, Url,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

// Common test constants
pub const TEST_PATH: &str = "/blend.gz";
pub const TEST_ETAG: &str = "779ccf330e7c227ebbf7b34f0a6bae79";

/// Initialise test logging once; controlled by `RUST_LOG`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Lists the names of the files in `dir`.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Temp path the engine uses for `outpath`.
pub fn temp_path(outpath: &Path) -> PathBuf {
    parafetch::download::temp_path_for(outpath)
}

/// A builder for `server`'s test resource with no pause between attempts.
pub fn test_builder(server: &ServerGuard, outpath: &Path) -> DownloaderBuilder {
    DownloaderBuilder::new(outpath, format!("{}{}", server.url(), TEST_PATH))
        .retry_pause(Duration::ZERO)
        .connect_timeout(Some(Duration::from_secs(10)))
}

/// Mocks the `bytes=0-0` probe of a resource of `content`.
pub async fn mock_probe(server: &mut ServerGuard, content: &[u8], etag: Option<&str>) -> Mock {
    let mut mock = server
        .mock("GET", TEST_PATH)
        .match_header("range", "bytes=0-0")
        .with_status(206)
        .with_header("content-range", &format!("bytes 0-0/{}", content.len()))
        .with_body(&content[..1]);
    if let Some(etag) = etag {
        mock = mock.with_header("etag", &format!("\"{}\"", etag));
    }
    mock.create_async().await
}

/// Mocks one segment range answering with `status` and the matching slice of `content`.
pub async fn mock_segment(
    server: &mut ServerGuard,
    content: &[u8],
    start: usize,
    len: usize,
    status: usize,
) -> Mock {
    let end = start + len - 1;
    server
        .mock("GET", TEST_PATH)
        .match_header("range", format!("bytes={}-{}", start, end).as_str())
        .with_status(status)
        .with_header(
            "content-range",
            &format!("bytes {}-{}/{}", start, end, content.len()),
        )
        .with_body(&content[start..=end])
        .create_async()
        .await
}

/// Mocks every segment of the plan for `content` and `max_threads` with a 206 answer.
pub async fn mock_all_segments(
    server: &mut ServerGuard,
    content: &[u8],
    max_threads: usize,
) -> Vec<Mock> {
    let plan = parafetch::plan_segments(content.len() as u64, max_threads).unwrap();
    let mut mocks = Vec::new();
    for segment in &plan {
        mocks.push(
            mock_segment(
                server,
                content,
                segment.start_offset() as usize,
                segment.length() as usize,
                206,
            )
            .await,
        );
    }
    mocks
}

/// One scripted answer of [`ScriptedTransport`].
pub enum Reply {
    /// 206 with the requested slice of the resource.
    Slice,
    /// A fixed status with an empty body.
    Status(StatusCode),
    /// A transport-level failure.
    Reset,
}

/// In-memory origin whose answers per range can be scripted.
pub struct ScriptedTransport {
    content: Vec<u8>,
    etag: Option<String>,
    scripts: Mutex<Vec<(u64, Vec<Reply>)>>,
    requests: Mutex<Vec<ByteRange>>,
}

impl ScriptedTransport {
    pub fn new(content: Vec<u8>, etag: Option<&str>) -> Self {
        Self {
            content,
            etag: etag.map(String::from),
            scripts: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script the answers for ranges starting at `first`; once used up, ranges are served normally.
    pub fn script(self, first: u64, replies: Vec<Reply>) -> Self {
        self.scripts.lock().unwrap().push((first, replies));
        self
    }

    /// Number of requests whose range started at `first`.
    pub fn requests_at(&self, first: u64) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|range| range.first == first && **range != ByteRange::probe())
            .count()
    }

    fn next_reply(&self, range: ByteRange) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        for (first, replies) in scripts.iter_mut() {
            if *first == range.first && range != ByteRange::probe() && !replies.is_empty() {
                return replies.remove(0);
            }
        }
        Reply::Slice
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_range(
        &self,
        _url: &Url,
        range: ByteRange,
        _timeouts: RequestTimeouts,
    ) -> Result<RangeResponse> {
        self.requests.lock().unwrap().push(range);

        let mut headers = HeaderMap::new();
        let status = match self.next_reply(range) {
            Reply::Reset => return Err(Error::transport("connection reset by peer")),
            Reply::Status(status) => {
                return Ok(RangeResponse {
                    status,
                    headers,
                    body: stream::empty().boxed(),
                })
            }
            Reply::Slice => StatusCode::PARTIAL_CONTENT,
        };

        let total = self.content.len() as u64;
        let last = range.last.min(total - 1);
        headers.insert(
            CONTENT_RANGE,
            HeaderValue::from_str(&format!("bytes {}-{}/{}", range.first, last, total)).unwrap(),
        );
        if let Some(ref etag) = self.etag {
            headers.insert(ETAG, HeaderValue::from_str(&format!("\"{}\"", etag)).unwrap());
        }

        let slice = self.content[range.first as usize..=last as usize].to_vec();
        let chunks: Vec<Result<Bytes>> = slice
            .chunks(64 * 1024)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(RangeResponse {
            status,
            headers,
            body: stream::iter(chunks).boxed(),
        })
    }
}
