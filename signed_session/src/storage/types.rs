use serde::{Deserialize, Serialize};

use crate::cookie::CookieData;

/// Persisted form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub cookie: CookieData,
}

/// Out-of-band connectivity notifications emitted by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The store is available
    Work,
    /// The store is unavailable
    Disconnect,
    /// The store is pausing, a later `Work` or `Disconnect` is expected
    Block,
}
