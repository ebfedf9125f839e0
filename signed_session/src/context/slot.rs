//! Per-request session slots, bound as a task-local for the duration of one request.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

use crate::session::{Session, SessionError};

tokio::task_local! {
    // One slot per session context, keyed by the context's identity
    static REQUEST_SLOTS: RefCell<HashMap<u64, Session>>;
}

pub(crate) fn in_scope() -> bool {
    REQUEST_SLOTS.try_with(|_| ()).is_ok()
}

/// Run `fut` with request slots available, reusing an enclosing scope if there is one.
pub(crate) async fn scope<F: Future>(fut: F) -> F::Output {
    if in_scope() {
        fut.await
    } else {
        REQUEST_SLOTS.scope(RefCell::new(HashMap::new()), fut).await
    }
}

pub(crate) fn get(key: u64) -> Option<Session> {
    REQUEST_SLOTS
        .try_with(|slots| slots.borrow().get(&key).cloned())
        .ok()
        .flatten()
}

pub(crate) fn with_mut<R>(
    key: u64,
    f: impl FnOnce(&mut Option<Session>) -> R,
) -> Result<R, SessionError> {
    REQUEST_SLOTS
        .try_with(|slots| {
            let mut slots = slots.borrow_mut();
            let mut slot = slots.remove(&key);
            let result = f(&mut slot);
            if let Some(session) = slot {
                slots.insert(key, session);
            }
            result
        })
        .map_err(|_| SessionError::OutOfScope)
}

/// Clears a context's slot when dropped, on every exit path of the provider.
pub(crate) struct SlotReset(u64);

impl SlotReset {
    pub(crate) fn new(key: u64) -> Self {
        Self(key)
    }
}

impl Drop for SlotReset {
    fn drop(&mut self) {
        let _ = REQUEST_SLOTS.try_with(|slots| {
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.remove(&self.0);
            }
        });
    }
}
