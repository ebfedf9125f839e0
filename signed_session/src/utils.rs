use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use thiserror::Error;

/// Parse a timestamp given either as RFC 3339 or as an HTTP date (RFC 2822 family).
pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, UtilError> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| UtilError::Format(format!("Invalid date: {raw}")))
}

pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    cookie: String,
) -> Result<&HeaderMap, UtilError> {
    tracing::trace!("Set-Cookie: {}", cookie);
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(headers)
}

/// Name part of a `Set-Cookie` header value, i.e. everything before the first `=`.
fn set_cookie_name(value: &HeaderValue) -> Option<&str> {
    let raw = value.to_str().ok()?;
    raw.split_once('=').map(|(name, _)| name.trim())
}

/// Merge `overlay` into `base`. The overlay wins for every header name it carries.
///
/// `Set-Cookie` is special-cased: only base cookies sharing a name with an overlay
/// cookie are replaced, unrelated cookies set by the base survive. The operation is
/// order-sensitive, `merge_headers(a, b)` and `merge_headers(b, a)` differ whenever
/// both sides set the same header.
pub fn merge_headers(base: &mut HeaderMap, overlay: HeaderMap) {
    let overlay_cookie_names: Vec<String> = overlay
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| set_cookie_name(v).map(str::to_string))
        .collect();

    if !overlay_cookie_names.is_empty() {
        let kept: Vec<HeaderValue> = base
            .get_all(SET_COOKIE)
            .iter()
            .filter(|v| match set_cookie_name(v) {
                Some(name) => !overlay_cookie_names.iter().any(|n| n == name),
                None => true,
            })
            .cloned()
            .collect();
        base.remove(SET_COOKIE);
        for value in kept {
            base.append(SET_COOKIE, value);
        }
    }

    let mut current = None;
    for (name, value) in overlay {
        // `None` means "same header name as the previous entry"
        if let Some(name) = name {
            if name != SET_COOKIE {
                base.remove(&name);
            }
            current = Some(name);
        }
        if let Some(name) = current.as_ref() {
            base.append(name.clone(), value);
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}
