use std::collections::HashMap;

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, Response};
use signed_session::{RequestMeta, SessionContext};

/// Minimal cookie-keeping client: remembers cookies from `Set-Cookie` and replays
/// them on the following requests.
#[derive(Default)]
pub struct MockBrowser {
    cookies: HashMap<String, String>,
    secure: bool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend every request arrives over TLS.
    pub fn over_tls() -> Self {
        Self {
            cookies: HashMap::new(),
            secure: true,
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn forget(&mut self) {
        self.cookies.clear();
    }

    pub fn request(&self, path: &str) -> RequestMeta {
        let mut headers = HeaderMap::new();
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, header.parse().expect("valid cookie header"));
        }
        RequestMeta::new(path, headers).with_tls(self.secure)
    }

    /// Send a request through the provider. Returns the session id the handler saw.
    pub async fn visit(&mut self, context: &SessionContext, path: &str) -> Option<String> {
        let handler_context = context.clone();
        let response = context
            .provide(self.request(path), move || async move {
                let mut response = Response::new(());
                if let Some(id) = handler_context.id() {
                    response
                        .headers_mut()
                        .insert("x-session-id", id.parse().expect("valid id"));
                }
                response
            })
            .await;

        self.absorb(&response);
        response
            .headers()
            .get("x-session-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn absorb<B>(&mut self, response: &Response<B>) {
        for value in response.headers().get_all(SET_COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            let pair = value.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
}
