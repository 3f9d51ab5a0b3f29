//! HTTP Range request handling
//!
//! Single `bytes=` ranges only (RFC 7233); anything else is served in full.

/// How a `Range` header applies to a representation of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable Range header; send the whole body
    Full,
    /// Inclusive byte span to send with 206
    Partial { start: usize, end: usize },
    /// Range lies outside the representation; answer 416
    Unsatisfiable,
}

/// Resolve a `Range` header against a body of `len` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Multi-range and malformed headers fall back to [`RangeOutcome::Full`].
pub fn parse_range_header(header: Option<&str>, len: usize) -> RangeOutcome {
    let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if ranges.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = ranges.split_once('-') else {
        return RangeOutcome::Full;
    };

    match (first.trim(), last.trim()) {
        ("", suffix) => suffix_range(suffix, len),
        (start, end) => bounded_range(start, end, len),
    }
}

fn suffix_range(suffix: &str, len: usize) -> RangeOutcome {
    let Ok(suffix) = suffix.parse::<usize>() else {
        return RangeOutcome::Full;
    };
    if suffix == 0 || len == 0 {
        return RangeOutcome::Unsatisfiable;
    }
    RangeOutcome::Partial {
        start: len.saturating_sub(suffix),
        end: len - 1,
    }
}

fn bounded_range(start: &str, end: &str, len: usize) -> RangeOutcome {
    let Ok(start) = start.parse::<usize>() else {
        return RangeOutcome::Full;
    };
    if start >= len {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if end.is_empty() {
        len - 1
    } else {
        match end.parse::<usize>() {
            Ok(end) => end.min(len - 1),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if start > end {
        RangeOutcome::Unsatisfiable
    } else {
        RangeOutcome::Partial { start, end }
    }
}
