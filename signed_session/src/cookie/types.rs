use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    None,
    Strict,
    Lax,
}

impl SameSite {
    /// Accepts exactly `None`, `Strict` or `Lax`.
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "None" => Some(Self::None),
            "Strict" => Some(Self::Strict),
            "Lax" => Some(Self::Lax),
            _ => None,
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::None => "None",
            Self::Strict => "Strict",
            Self::Lax => "Lax",
        };
        f.write_str(value)
    }
}

/// Cookie sub-configuration of the session options.
///
/// `max_age` is in milliseconds. When both `max_age` and `expires` are given,
/// `max_age` wins.
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    /// Raw value, anything other than `None`/`Strict`/`Lax` leaves the attribute unset
    pub same_site: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
}

impl CookieOptions {
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = Some(http_only);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn with_same_site(mut self, same_site: impl Into<String>) -> Self {
        self.same_site = Some(same_site.into());
        self
    }

    pub fn with_max_age(mut self, max_age_ms: i64) -> Self {
        self.max_age = Some(max_age_ms);
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn path_or_default(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_COOKIE_PATH)
    }
}

/// Serializable view of a session cookie, persisted alongside the session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieData {
    #[serde(default)]
    pub original_max_age: Option<i64>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    #[serde(default)]
    pub domain: Option<String>,
    pub path: String,
    #[serde(default)]
    pub same_site: Option<SameSite>,
}
