use http::{HeaderMap, Response};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{GenId, SessionOptions, default_genid};
use crate::cookie::{CookieOptions, SessionCookie};
use crate::session::{Session, SessionError};
use crate::signature::{sign_cookie, unsign_cookie};
use crate::storage::{MemoryStore, SessionStore};
use crate::utils::{header_set_cookie, merge_headers};

use super::connectivity::{Connectivity, ConnectivityState};
use super::request::RequestMeta;
use super::slot::{self, SlotReset};

static NEXT_CONTEXT_KEY: AtomicU64 = AtomicU64::new(1);

struct ContextInner {
    key: u64,
    secrets: Vec<String>,
    name: String,
    cookie_options: CookieOptions,
    genid: GenId,
    store: Arc<dyn SessionStore>,
    trust_proxy: bool,
    connectivity: Arc<Connectivity>,
}

/// Session context: owns the configuration, the store connectivity state and the
/// per-request session slot.
///
/// Cloning is cheap and clones share everything, including the slot identity.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<ContextInner>,
}

impl SessionContext {
    pub fn new(options: SessionOptions) -> Result<Self, SessionError> {
        options.validate()?;

        let store = options
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let connectivity = Arc::new(Connectivity::new());
        store.subscribe(connectivity.clone());

        tracing::debug!(
            "Creating session context: name={}, path={}, proxy={}",
            options.name,
            options.cookie.path_or_default(),
            options.proxy
        );

        Ok(Self {
            inner: Arc::new(ContextInner {
                key: NEXT_CONTEXT_KEY.fetch_add(1, Ordering::Relaxed),
                secrets: options.secret,
                name: options.name,
                cookie_options: options.cookie,
                genid: options.genid.unwrap_or_else(default_genid),
                store,
                trust_proxy: options.proxy,
                connectivity,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.inner.store.clone()
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.inner.connectivity
    }

    /// Session bound to the current request, if any.
    pub fn session(&self) -> Option<Session> {
        slot::get(self.inner.key)
    }

    pub fn id(&self) -> Option<String> {
        self.session().map(|session| session.id().to_string())
    }

    pub fn cookie(&self) -> Option<SessionCookie> {
        self.session().map(|session| session.cookie().clone())
    }

    /// Mutate the bound session in place.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        slot::with_mut(self.inner.key, |slot| slot.as_mut().map(f))
            .ok()
            .flatten()
    }

    /// Open a request scope so the slot can be used before the provider runs.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        slot::scope(fut).await
    }

    /// Generate and bind a new session. If one is already bound it is returned as-is.
    pub fn generate(&self) -> Result<Session, SessionError> {
        let session = Session::new(
            (self.inner.genid)(),
            SessionCookie::new(&self.inner.cookie_options),
            self.inner.store.clone(),
        );
        self.bind(session)
    }

    /// Remove the bound session from the store and clear the slot.
    pub async fn destroy(&self) -> Result<Option<Session>, SessionError> {
        let session = slot::with_mut(self.inner.key, Option::take)?;
        if let Some(session) = &session {
            tracing::debug!("Destroying session {}", session.id());
            session.destroy().await?;
        }
        Ok(session)
    }

    /// Replace the bound session with a freshly generated one.
    pub async fn regenerate(&self) -> Result<Session, SessionError> {
        self.destroy().await?;
        self.generate()
    }

    /// Re-arm the bound session's expiry.
    pub fn touch(&self) -> Option<Session> {
        self.with_session(|session| {
            session.touch();
            session.clone()
        })
    }

    fn bind(&self, session: Session) -> Result<Session, SessionError> {
        slot::with_mut(self.inner.key, |slot| match slot {
            Some(existing) => {
                tracing::debug!(
                    "Session {} already bound, ignoring {}",
                    existing.id(),
                    session.id()
                );
                existing.clone()
            }
            None => {
                *slot = Some(session.clone());
                session
            }
        })
    }

    /// Run `next` with session handling around it.
    ///
    /// Resolves or generates the session before `next`, then persists it and merges
    /// the `Set-Cookie` header into the downstream response. The request never fails
    /// because of session problems, those only downgrade it to a session-less request.
    #[tracing::instrument(skip_all, fields(path = %request.path()))]
    pub async fn provide<B, F, Fut>(&self, request: RequestMeta, next: F) -> Response<B>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Response<B>>,
    {
        slot::scope(async move {
            let _reset = SlotReset::new(self.inner.key);

            if self.session().is_some() {
                tracing::debug!("Session already bound for this request");
                let response = next().await;
                return self.finalize(&request, response).await;
            }

            match self.inner.connectivity.ready().await {
                ConnectivityState::Working => {}
                state => {
                    tracing::warn!("Session store is {}, continuing without a session", state);
                    return next().await;
                }
            }

            if !request.path().starts_with(self.inner.cookie_options.path_or_default()) {
                tracing::debug!("Path outside of cookie scope, skipping session handling");
                return next().await;
            }

            self.resolve(&request).await;

            let response = next().await;
            self.finalize(&request, response).await
        })
        .await
    }

    async fn resolve(&self, request: &RequestMeta) {
        let sid = request.cookie(&self.inner.name).and_then(|raw| {
            let sid = unsign_cookie(&raw, &self.inner.secrets);
            if sid.is_none() {
                tracing::warn!("Session cookie signature is invalid, treating as absent");
            }
            sid
        });

        let hydrated = match sid {
            Some(sid) => match self.inner.store.get(&sid).await {
                Ok(Some(record)) => {
                    tracing::debug!("Hydrated session {}", record.id);
                    Some(Session::from_record(record, self.inner.store.clone()))
                }
                Ok(None) => {
                    tracing::debug!("Session {} not found, generating a new one", sid);
                    None
                }
                Err(e) => {
                    tracing::warn!("Failed to load session {}: {}", sid, e);
                    None
                }
            },
            None => None,
        };

        let bound = match hydrated {
            Some(session) => self.bind(session),
            None => self.generate(),
        };
        if let Err(e) = bound {
            tracing::warn!("Failed to bind session: {}", e);
        }
    }

    async fn finalize<B>(&self, request: &RequestMeta, mut response: Response<B>) -> Response<B> {
        let Some(session) = self.session() else {
            return response;
        };

        // A session bound before the provider ran never waited on connectivity
        match self.inner.connectivity.state() {
            ConnectivityState::Working => {
                if let Err(e) = session.save().await {
                    tracing::error!("Failed to save session {}: {}", session.id(), e);
                }
            }
            state => tracing::warn!("Session store is {}, not saving {}", state, session.id()),
        }

        if session.cookie().secure && !request.is_secure(self.inner.trust_proxy) {
            tracing::debug!("Secure session cookie over an insecure connection, not sending it");
            return response;
        }

        match self.cookie_headers(&session) {
            Ok(headers) => merge_headers(response.headers_mut(), headers),
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
        response
    }

    fn cookie_headers(&self, session: &Session) -> Result<HeaderMap, SessionError> {
        let secret = self
            .inner
            .secrets
            .first()
            .ok_or_else(|| SessionError::Crypto("No signing secret configured".to_string()))?;
        let signed = sign_cookie(session.id(), secret);
        let value = urlencoding::encode(&signed);

        let mut headers = HeaderMap::new();
        header_set_cookie(
            &mut headers,
            session.cookie().to_header_value(&self.inner.name, &value),
        )?;
        Ok(headers)
    }
}
