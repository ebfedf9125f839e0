use chrono::{DateTime, TimeDelta, Utc};

use crate::session::SessionError;
use crate::utils::parse_date;

use super::types::{CookieData, CookieOptions, DEFAULT_COOKIE_PATH, SameSite};

/// Live cookie attributes of a session.
///
/// The expiry is always stored as an absolute `expires` timestamp. `max_age` reads
/// are derived from it, which is also how Max-Age gets folded into `Expires` on the
/// wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCookie {
    pub domain: Option<String>,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    expires: Option<DateTime<Utc>>,
    max_age: Option<i64>,
    original_max_age: Option<i64>,
}

/// `now + max_age_ms`, or `None` when that falls outside the representable range.
pub(crate) fn expiry_after(max_age_ms: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_milliseconds(max_age_ms).and_then(|delta| Utc::now().checked_add_signed(delta))
}

impl SessionCookie {
    pub fn new(options: &CookieOptions) -> Self {
        let max_age = options.max_age.filter(|ms| *ms != 0);
        let expires = match max_age {
            Some(ms) => {
                let expires = expiry_after(ms);
                if expires.is_none() {
                    tracing::warn!("Max-age {ms}ms is out of range, leaving expires unset");
                }
                expires
            }
            None => options.expires,
        };

        let same_site = match options.same_site.as_deref() {
            Some(raw) => {
                let parsed = SameSite::parse(raw);
                if parsed.is_none() {
                    tracing::warn!("Ignoring invalid SameSite value: {raw:?}");
                }
                parsed
            }
            None => None,
        };

        Self {
            domain: options.domain.clone(),
            path: options
                .path
                .clone()
                .unwrap_or_else(|| DEFAULT_COOKIE_PATH.to_string()),
            http_only: options.http_only.unwrap_or(true),
            secure: options.secure.unwrap_or(true),
            same_site,
            expires,
            max_age,
            original_max_age: max_age,
        }
    }

    /// Rebuild cookie attributes from their persisted form, keeping the baseline max-age.
    pub fn from_data(data: CookieData) -> Self {
        Self {
            domain: data.domain,
            path: data.path,
            http_only: data.http_only,
            secure: data.secure,
            same_site: data.same_site,
            expires: data.expires,
            max_age: None,
            original_max_age: data.original_max_age,
        }
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Milliseconds left until expiry, `None` for a non-persistent cookie.
    pub fn max_age(&self) -> Option<i64> {
        self.expires
            .map(|expires| (expires - Utc::now()).num_milliseconds())
    }

    /// The max-age most recently applied through [`Self::set_max_age`], cleared by
    /// an explicit expiry.
    pub fn tracked_max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn original_max_age(&self) -> Option<i64> {
        self.original_max_age
    }

    /// Out-of-range values are ignored with a warning.
    pub fn set_max_age(&mut self, max_age_ms: i64) {
        let Some(expires) = expiry_after(max_age_ms) else {
            tracing::warn!("Max-age {max_age_ms}ms is out of range, cookie left unchanged");
            return;
        };
        self.expires = Some(expires);
        self.max_age = Some(max_age_ms);
    }

    pub fn set_expires(&mut self, expires: DateTime<Utc>) {
        self.max_age = None;
        self.expires = Some(expires);
    }

    /// Like [`Self::set_expires`] for an unparsed date. Invalid input leaves the
    /// cookie untouched.
    pub fn set_expires_str(&mut self, raw: &str) -> Result<(), SessionError> {
        match parse_date(raw) {
            Ok(expires) => {
                self.set_expires(expires);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Invalid date set to `expires`: {raw:?}");
                Err(e.into())
            }
        }
    }

    /// Re-arm the expiry from the baseline max-age. No-op for cookies without one.
    pub fn rearm(&mut self) {
        if let Some(original) = self.original_max_age {
            self.set_max_age(original);
        }
    }

    pub fn data(&self) -> CookieData {
        CookieData {
            original_max_age: self.original_max_age,
            expires: self.expires,
            secure: self.secure,
            http_only: self.http_only,
            domain: self.domain.clone(),
            path: self.path.clone(),
            same_site: self.same_site,
        }
    }

    /// Render a `Set-Cookie` header value. `value` must already be cookie-safe.
    pub fn to_header_value(&self, name: &str, value: &str) -> String {
        let mut cookie = format!("{name}={value}");
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={domain}"));
        }
        cookie.push_str(&format!("; Path={}", self.path));
        if let Some(expires) = self.expires {
            cookie.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(same_site) = self.same_site {
            cookie.push_str(&format!("; SameSite={same_site}"));
        }
        cookie
    }
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(&CookieOptions::default())
    }
}
