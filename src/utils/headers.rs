//! Probe response header parsing.
//!
//! The probe asks for `bytes=0-0`; a range-serving origin answers with
//! `Content-Range: bytes 0-0/<total>` and usually an `ETag`. Header names are
//! matched case-insensitively by [`HeaderMap`]; the values are matched on
//! fixed prefixes.

use reqwest::header::{HeaderMap, CONTENT_RANGE, ETAG};

const PROBE_RANGE_PREFIX: &str = "bytes 0-0/";

/// Extract the total size from a probe's `Content-Range` value.
///
/// The value must start with `bytes 0-0/` (ASCII case-insensitive). The
/// leading decimal digits after it give the size; anything else (such as the
/// `*` of an unsatisfied range) yields 0.
///
/// # Example
///
/// ```rust
/// use parafetch::utils::parse_probe_content_range;
///
/// assert_eq!(parse_probe_content_range("bytes 0-0/2048"), Some(2048));
/// assert_eq!(parse_probe_content_range("bytes 0-0/*"), Some(0));
/// assert_eq!(parse_probe_content_range("bytes 0-1023/2048"), None);
/// ```
pub fn parse_probe_content_range(content_range: &str) -> Option<u64> {
    let prefix = content_range.get(..PROBE_RANGE_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PROBE_RANGE_PREFIX) {
        return None;
    }

    let total = content_range[PROBE_RANGE_PREFIX.len()..].trim_start();
    let digits = total
        .find(|c: char| !c.is_ascii_digit())
        .map_or(total, |end| &total[..end]);
    Some(digits.parse::<u64>().unwrap_or(0))
}

/// Extract the opaque tag from a strong `ETag` value, dropping the quotes.
///
/// Values that do not start with a quote or lack the closing quote (weak
/// `W/"..."` tags included) are ignored.
///
/// # Example
///
/// ```rust
/// use parafetch::utils::parse_etag;
///
/// assert_eq!(parse_etag("\"779ccf33\""), Some("779ccf33".to_string()));
/// assert_eq!(parse_etag("W/\"779ccf33\""), None);
/// ```
pub fn parse_etag(etag: &str) -> Option<String> {
    let rest = etag.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Read the content length and entity tag out of probe response headers.
///
/// A missing or unparsable `Content-Range` gives a length of 0.
pub fn probe_headers(headers: &HeaderMap) -> (u64, Option<String>) {
    let content_length = headers
        .get_all(CONTENT_RANGE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_probe_content_range)
        .last()
        .unwrap_or(0);

    let etag = headers
        .get_all(ETAG)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_etag)
        .last();

    (content_length, etag)
}
