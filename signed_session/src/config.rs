//! Session context options and their environment-driven defaults

use std::env;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::cookie::{CookieOptions, expiry_after};
use crate::session::SessionError;
use crate::storage::SessionStore;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "connect.sid";

/// Cookie name used when the options don't set one
/// Default: "connect.sid"
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| DEFAULT_SESSION_COOKIE_NAME.to_string())
});

/// Whether `x-forwarded-proto` is trusted when the options don't say
/// Default: true
pub static SESSION_TRUST_PROXY: LazyLock<bool> = LazyLock::new(|| {
    env::var("SESSION_TRUST_PROXY")
        .map(|val| val.to_lowercase() != "false")
        .unwrap_or(true)
});

/// Session id generator.
pub type GenId = Arc<dyn Fn() -> String + Send + Sync>;

pub(crate) fn default_genid() -> GenId {
    Arc::new(|| uuid::Uuid::new_v4().to_string())
}

#[derive(Clone)]
pub struct SessionOptions {
    /// Signing secrets. The first one signs, any of them verifies.
    pub secret: Vec<String>,
    pub name: String,
    pub genid: Option<GenId>,
    pub store: Option<Arc<dyn SessionStore>>,
    pub cookie: CookieOptions,
    /// Trust `x-forwarded-proto` when deciding whether the connection is secure
    pub proxy: bool,
}

impl SessionOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_secrets([secret.into()])
    }

    pub fn with_secrets<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secret: secrets.into_iter().map(Into::into).collect(),
            name: SESSION_COOKIE_NAME.clone(),
            genid: None,
            store: None,
            cookie: CookieOptions::default(),
            proxy: *SESSION_TRUST_PROXY,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_genid<F>(mut self, genid: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.genid = Some(Arc::new(genid));
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_cookie(mut self, cookie: CookieOptions) -> Self {
        self.cookie = cookie;
        self
    }

    pub fn with_proxy(mut self, proxy: bool) -> Self {
        self.proxy = proxy;
        self
    }

    /// Build options from `SESSION_*` environment variables.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SessionError> {
        let secrets: Vec<String> = lookup("SESSION_SECRET")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if secrets.is_empty() {
            return Err(SessionError::Config(
                "SESSION_SECRET must be set to one or more comma separated secrets".to_string(),
            ));
        }

        let mut cookie = CookieOptions {
            path: lookup("SESSION_COOKIE_PATH"),
            domain: lookup("SESSION_COOKIE_DOMAIN"),
            same_site: lookup("SESSION_COOKIE_SAME_SITE"),
            ..CookieOptions::default()
        };
        cookie.max_age = match lookup("SESSION_COOKIE_MAX_AGE") {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                SessionError::Config(format!("SESSION_COOKIE_MAX_AGE is not a number: {raw}"))
            })?),
            None => None,
        };
        check_max_age(cookie.max_age)?;
        cookie.secure = lookup("SESSION_COOKIE_SECURE").map(|val| val.to_lowercase() != "false");

        let name = lookup("SESSION_COOKIE_NAME")
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string());
        let proxy = lookup("SESSION_TRUST_PROXY")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);

        Ok(Self::with_secrets(secrets)
            .with_name(name)
            .with_cookie(cookie)
            .with_proxy(proxy))
    }

    pub(crate) fn validate(&self) -> Result<(), SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::Config(
                "secret option array must contain one or more strings".to_string(),
            ));
        }
        if self.secret.iter().any(String::is_empty) {
            return Err(SessionError::Config("secret is required".to_string()));
        }
        if self.name.is_empty() {
            return Err(SessionError::Config(
                "cookie name must not be empty".to_string(),
            ));
        }
        check_max_age(self.cookie.max_age)
    }
}

fn check_max_age(max_age: Option<i64>) -> Result<(), SessionError> {
    match max_age {
        Some(ms) if ms != 0 && expiry_after(ms).is_none() => Err(SessionError::Config(format!(
            "cookie max age {ms}ms is out of range"
        ))),
        _ => Ok(()),
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("secret", &format_args!("[{} redacted]", self.secret.len()))
            .field("name", &self.name)
            .field("genid", &self.genid.as_ref().map(|_| "custom"))
            .field("store", &self.store.as_ref().map(|_| "custom"))
            .field("cookie", &self.cookie)
            .field("proxy", &self.proxy)
            .finish()
    }
}
