use crate::UrlError;
use url::Url;

/// Scheme prepended to links entered without one
const DEFAULT_SCHEME: &str = "https://";

/// Normalizes a user-supplied link into an absolute http(s) URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Prepend `https://` when no scheme is present
/// 3. Parse the URL; reject if malformed
/// 4. Reject schemes other than http and https
/// 5. Reject URLs without a host
///
/// Host case and the trailing root slash are normalized by the URL parser;
/// path, query and fragment are otherwise kept as entered.
///
/// # Examples
///
/// ```
/// use linkwatch::url::normalize_link_url;
///
/// let url = normalize_link_url("Example.com/bio").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/bio");
/// ```
pub fn normalize_link_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// True if `input` starts with `scheme://`
///
/// Only a leading scheme counts; a `://` later in the path or query does not.
fn has_scheme(input: &str) -> bool {
    let end = match input.find("://") {
        Some(end) => end,
        None => return false,
    };
    let scheme = &input[..end];

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}
