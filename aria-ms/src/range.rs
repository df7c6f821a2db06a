//! Range-request parsing and HTTP caching validators
//!
//! Pure logic for the byte-range serving state machine: `Range` header
//! parsing into an inclusive, normalized `ByteRange`, and the
//! size+mtime-derived `ETag` used for conditional requests.

use std::time::{SystemTime, UNIX_EPOCH};

/// Cache lifetime for immutable media responses (one year).
pub const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Cache lifetime for static assets and metadata (one hour).
pub const CACHE_SHORT: &str = "public, max-age=3600";

/// Cache lifetime for the track list (five minutes).
pub const CACHE_LIST: &str = "public, max-age=300";

/// An inclusive byte range, normalized against a file size:
/// `0 <= start <= end < size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered (the response `Content-Length`). An
    /// inclusive range always covers at least one byte.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Outcome of parsing a well-formed `Range` header against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// Serve a 206 with exactly these bytes.
    Satisfiable(ByteRange),
    /// Serve a 416 with `Content-Range: bytes */{size}`.
    Unsatisfiable,
}

/// Parse a `Range` header against a file size.
///
/// Handles the three single-range forms: `bytes=start-end`,
/// `bytes=start-` (open end), and `bytes=-suffix` (final `suffix` bytes).
/// Returns `None` for anything malformed, which callers treat as "no
/// range requested" per RFC 9110's ignore-invalid guidance. An explicit
/// end past the file is clamped to the final byte.
pub fn parse_range(header: &str, file_size: u64) -> Option<RangeRequest> {
    let spec = header.trim().strip_prefix("bytes=")?;
    let (start_text, end_text) = spec.split_once('-')?;
    let start_text = start_text.trim();
    let end_text = end_text.trim();

    let (start, end) = if start_text.is_empty() {
        // Suffix form: the final `suffix` bytes of the file
        let suffix: u64 = end_text.parse().ok()?;
        if suffix == 0 {
            return Some(RangeRequest::Unsatisfiable);
        }
        (file_size.saturating_sub(suffix), file_size.saturating_sub(1))
    } else {
        let start: u64 = start_text.parse().ok()?;
        let end = if end_text.is_empty() {
            file_size.saturating_sub(1)
        } else {
            end_text.parse().ok()?
        };
        (start, end)
    };

    if file_size == 0 || start >= file_size || start > end {
        return Some(RangeRequest::Unsatisfiable);
    }
    Some(RangeRequest::Satisfiable(ByteRange {
        start,
        end: end.min(file_size - 1),
    }))
}

/// ETag derived from file size and modification time, quoted.
///
/// Changes if and only if size or mtime changes, which makes it a stable
/// validator for both `If-None-Match` and long-lived immutable caching.
pub fn etag(size: u64, mtime: SystemTime) -> String {
    let mtime_millis = mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("\"{size}-{mtime_millis}\"")
}
