//! Zero-allocation field parsing for mapped-read lines.
//!
//! Fields are located with memchr and numbers are parsed straight from
//! bytes, so the hot path never builds an intermediate `Vec<&str>`.

use memchr::memchr;

/// Fast u64 parsing - no allocation, no error formatting.
///
/// Returns None if the input is empty, contains non-digit characters or
/// does not fit in a u64.
#[inline(always)]
pub fn parse_u64_fast(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// Parse a mismatch score. Integers take the fast path; anything else
/// (fractional scores, exponents) falls back to `str::parse`.
///
/// Scores are finite and non-negative; anything else is rejected.
#[inline]
pub fn parse_score(bytes: &[u8]) -> Option<f64> {
    if let Some(n) = parse_u64_fast(bytes) {
        return Some(n as f64);
    }
    let score: f64 = std::str::from_utf8(bytes).ok()?.parse().ok()?;
    (score.is_finite() && score >= 0.0).then_some(score)
}

/// Split a line into at most `N` tab-separated fields using memchr.
///
/// Returns the number of fields found. Fields beyond `N` are left joined in
/// the last slot.
#[inline]
pub fn split_tabs<'a, const N: usize>(line: &'a [u8], fields: &mut [&'a [u8]; N]) -> usize {
    let mut rest = line;
    let mut count = 0;
    while count < N {
        if count == N - 1 {
            fields[count] = rest;
            return N;
        }
        match memchr(b'\t', rest) {
            Some(tab) => {
                fields[count] = &rest[..tab];
                rest = &rest[tab + 1..];
                count += 1;
            }
            None => {
                fields[count] = rest;
                return count + 1;
            }
        }
    }
    count
}

/// Strip a trailing `\n` or `\r\n`.
#[inline(always)]
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Check if a line should be skipped (empty, comment, or header).
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    line.is_empty() || line[0] == b'#' || line.starts_with(b"track") || line.starts_with(b"browser")
}
