use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Response},
};
use http::{StatusCode, request::Parts};

use signed_session::{Session, SessionContext, SessionCookie, SessionError};

/// Why a [`CurrentSession`] could not be extracted.
#[derive(Debug)]
pub enum SessionRejection {
    /// `provide_session` is not installed in front of this route
    MissingMiddleware,
    /// The middleware ran but no session is bound, e.g. the store is disconnected
    /// or the path is outside of the cookie scope
    Unavailable,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingMiddleware => {
                tracing::error!("CurrentSession used on a route without provide_session");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session middleware missing").into_response()
            }
            Self::Unavailable => {
                tracing::debug!("No session bound to this request");
                (StatusCode::SERVICE_UNAVAILABLE, "Session unavailable").into_response()
            }
        }
    }
}

/// Session bound to the current request, available as an Axum extractor
///
/// Changes made through this handle are written to the request slot, so they are
/// persisted and reflected in the `Set-Cookie` header once the handler returns.
///
/// # Example
///
/// ```no_run
/// use signed_session_axum::CurrentSession;
///
/// async fn logout(session: CurrentSession) -> &'static str {
///     let _ = session.destroy().await;
///     "bye"
/// }
/// ```
#[derive(Clone)]
pub struct CurrentSession {
    context: SessionContext,
    session: Session,
}

impl CurrentSession {
    pub fn id(&self) -> &str {
        self.session.id()
    }

    pub fn cookie(&self) -> &SessionCookie {
        self.session.cookie()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Change the cookie lifetime, in milliseconds.
    pub fn set_max_age(&mut self, max_age_ms: i64) {
        if let Some(session) = self.context.with_session(|session| {
            session.cookie_mut().set_max_age(max_age_ms);
            session.clone()
        }) {
            self.session = session;
        }
    }

    /// Re-arm the expiry with the original max age.
    pub fn touch(&mut self) {
        if let Some(session) = self.context.touch() {
            self.session = session;
        }
    }

    /// Swap the session for a new id, dropping the old record.
    pub async fn regenerate(&mut self) -> Result<(), SessionError> {
        self.session = self.context.regenerate().await?;
        Ok(())
    }

    /// Remove the session. No cookie is sent for this request afterwards.
    pub async fn destroy(self) -> Result<(), SessionError> {
        self.context.destroy().await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(SessionRejection::MissingMiddleware)?;

        let session = context.session().ok_or(SessionRejection::Unavailable)?;
        Ok(Self { context, session })
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <CurrentSession as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(session) => Ok(Some(session)),
            Err(SessionRejection::Unavailable) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
