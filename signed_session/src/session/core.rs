use std::fmt;
use std::sync::Arc;

use crate::cookie::SessionCookie;
use crate::session::errors::SessionError;
use crate::storage::{SessionRecord, SessionStore};

/// A live session bound to its id, cookie attributes and backing store.
///
/// Operations only touch the entity and the store, never the request slot.
#[derive(Clone)]
pub struct Session {
    id: String,
    cookie: SessionCookie,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Start a brand-new session.
    pub fn new(id: impl Into<String>, cookie: SessionCookie, store: Arc<dyn SessionStore>) -> Self {
        Self {
            id: id.into(),
            cookie,
            store,
        }
    }

    /// Hydrate a session from a persisted record.
    pub fn from_record(record: SessionRecord, store: Arc<dyn SessionStore>) -> Self {
        Self {
            id: record.id,
            cookie: SessionCookie::from_data(record.cookie),
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    pub fn cookie_mut(&mut self) -> &mut SessionCookie {
        &mut self.cookie
    }

    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.clone(),
            cookie: self.cookie.data(),
        }
    }

    /// Upsert the current attributes into the store.
    pub async fn save(&self) -> Result<(), SessionError> {
        self.store.set(&self.id, &self.record()).await?;
        Ok(())
    }

    /// Re-arm the expiry from the baseline max-age without changing the baseline.
    pub fn touch(&mut self) {
        self.cookie.rearm();
    }

    pub async fn destroy(&self) -> Result<(), SessionError> {
        self.store.destroy(&self.id).await?;
        Ok(())
    }

    /// Replace local attributes with the stored ones. No-op if the record is gone.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        if let Some(record) = self.store.get(&self.id).await? {
            self.cookie = SessionCookie::from_data(record.cookie);
        } else {
            tracing::debug!("Session {} not found in store, keeping local state", self.id);
        }
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}
