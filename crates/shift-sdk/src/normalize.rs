//! Input normalization for base URLs, endpoint paths and credentials.
//!
//! All functions are total: they never fail, they only canonicalize.

fn is_slash_or_space(c: char) -> bool {
    c == '/' || c.is_whitespace()
}

/// Trim whitespace and drop every trailing `/`, including slashes mixed
/// with trailing whitespace.
///
/// ```
/// use shift_sdk::normalize::normalize_base_url;
///
/// assert_eq!(normalize_base_url(" http://example.com/ "), "http://example.com");
/// ```
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim_start().trim_end_matches(is_slash_or_space).to_string()
}

/// Trim whitespace and drop leading and trailing `/`.
pub fn normalize_endpoint(raw: &str) -> String {
    raw.trim_matches(is_slash_or_space).to_string()
}

/// Trim surrounding whitespace. Case and length are left alone.
pub fn normalize_credential(raw: &str) -> String {
    raw.trim().to_string()
}
