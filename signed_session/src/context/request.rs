use headers::{Cookie, HeaderMapExt};
use http::HeaderMap;
use http::uri::Scheme;

/// Request extension marking a connection that terminated TLS in this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsConnection;

/// The parts of an incoming request the session provider looks at.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    path: String,
    headers: HeaderMap,
    tls: bool,
}

impl RequestMeta {
    pub fn new(path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            path: path.into(),
            headers,
            tls: false,
        }
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn from_parts(parts: &http::request::Parts) -> Self {
        let tls = parts.extensions.get::<TlsConnection>().is_some()
            || parts.uri.scheme() == Some(&Scheme::HTTPS);
        Self::new(parts.uri.path(), parts.headers.clone()).with_tls(tls)
    }

    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        let tls = request.extensions().get::<TlsConnection>().is_some()
            || request.uri().scheme() == Some(&Scheme::HTTPS);
        Self::new(request.uri().path(), request.headers().clone()).with_tls(tls)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Percent-decoded value of the named cookie.
    pub(crate) fn cookie(&self, name: &str) -> Option<String> {
        let cookies = self.headers.typed_get::<Cookie>()?;
        let raw = cookies.get(name)?;
        Some(
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string()),
        )
    }

    /// TLS on this hop, or with `trust_proxy`, `https` as the first `x-forwarded-proto`.
    pub(crate) fn is_secure(&self, trust_proxy: bool) -> bool {
        if self.tls {
            return true;
        }
        if !trust_proxy {
            return false;
        }

        self.headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
    }
}
