use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

use super::errors::StorageError;
use super::traits::{SessionStore, StoreEventListener};
use super::types::{SessionRecord, StoreEvent};

/// Reference store keeping serialized records in process memory.
///
/// Expired and unparseable records are dropped lazily on read. There is no
/// background sweep.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, String>>,
    listeners: StdMutex<Vec<Arc<dyn StoreEventListener>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self::default()
    }

    /// Broadcast a connectivity event to every subscribed listener.
    pub fn emit(&self, event: StoreEvent) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        tracing::debug!(
            "Emitting {:?} to {} store listener(s)",
            event,
            listeners.len()
        );
        for listener in listeners {
            listener.on_event(event);
        }
    }

    /// Store a raw value as-is, bypassing serialization.
    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, id: &str, raw: &str) {
        self.sessions
            .lock()
            .await
            .insert(id.to_string(), raw.to_string());
    }

    fn lookup(sessions: &mut HashMap<String, String>, id: &str) -> Option<SessionRecord> {
        let raw = sessions.get(id)?;

        let record: SessionRecord = match serde_json::from_str(raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Dropping corrupt session record {}: {}", id, e);
                sessions.remove(id);
                return None;
            }
        };

        if let Some(expires) = record.cookie.expires {
            if expires <= Utc::now() {
                tracing::debug!("Session {} expired at {}", id, expires);
                sessions.remove(id);
                return None;
            }
        }

        Some(record)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        let mut sessions = self.sessions.lock().await;
        Ok(Self::lookup(&mut sessions, id))
    }

    async fn set(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        let value = serde_json::to_string(record)?;
        self.sessions.lock().await.insert(id.to_string(), value);
        Ok(())
    }

    async fn touch(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        let mut sessions = self.sessions.lock().await;
        let Some(mut current) = Self::lookup(&mut sessions, id) else {
            return Ok(());
        };

        current.cookie = record.cookie.clone();
        let value = serde_json::to_string(&current)?;
        sessions.insert(id.to_string(), value);
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), StorageError> {
        self.sessions.lock().await.remove(id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.sessions.lock().await.clear();
        Ok(())
    }

    async fn length(&self) -> Result<usize, StorageError> {
        Ok(self.sessions.lock().await.len())
    }

    fn subscribe(&self, listener: Arc<dyn StoreEventListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }
}
