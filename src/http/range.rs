//! HTTP Range request parsing module
//!
//! Single `bytes=` range parsing. Multi-range requests are not supported and
//! are treated like a missing header.

use crate::config::SuffixRangeMode;

/// Inclusive byte window inside a file, `start <= end < file_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the window
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this window
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// No byte of the file falls in the window - should return 416
    NotSatisfiable,
    /// Header present but unparseable; served like `None`
    Malformed,
    /// No Range header
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, `end` clamped to the last byte
/// - `bytes=start-` - From start to end of file
/// - `bytes=-n` - `[0, n]` in [`SuffixRangeMode::Literal`], the last `n`
///   bytes in [`SuffixRangeMode::LastBytes`]
///
/// # Examples
/// ```
/// use vidserve::config::SuffixRangeMode;
/// use vidserve::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=100-199"), 1000, SuffixRangeMode::Literal);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 100, end: 199 }));
///
/// let result = parse_range_header(None, 1000, SuffixRangeMode::Literal);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range_header(
    range_header: Option<&str>,
    file_size: u64,
    suffix_mode: SuffixRangeMode,
) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::Malformed;
    };

    if spec.contains(',') {
        return RangeParseResult::Malformed;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::Malformed;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    match (start_str.is_empty(), end_str.is_empty()) {
        (true, true) => RangeParseResult::Malformed,
        (true, false) if suffix_mode == SuffixRangeMode::LastBytes => {
            parse_suffix_range(end_str, file_size)
        }
        _ => parse_bounded_range(start_str, end_str, file_size),
    }
}

/// RFC suffix range, e.g. "-500" is the final 500 bytes
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangeParseResult {
    let Some(suffix) = parse_offset(suffix_str) else {
        return RangeParseResult::Malformed;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    // A suffix longer than the file selects the whole file
    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// "start-end" where either side may be empty; empty start means 0
fn parse_bounded_range(start_str: &str, end_str: &str, file_size: u64) -> RangeParseResult {
    let start = if start_str.is_empty() {
        0
    } else {
        match parse_offset(start_str) {
            Some(s) => s,
            None => return RangeParseResult::Malformed,
        }
    };

    let end = if end_str.is_empty() {
        None
    } else {
        match parse_offset(end_str) {
            Some(e) => Some(e),
            None => return RangeParseResult::Malformed,
        }
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last = file_size - 1;
    let end = end.map_or(last, |e| e.min(last));

    if start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}

/// Digits only; `u64::from_str` would also take a leading '+'
fn parse_offset(s: &str) -> Option<u64> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
