use async_trait::async_trait;
use std::sync::Arc;

use super::errors::StorageError;
use super::types::{SessionRecord, StoreEvent};

/// Receiver of store connectivity events.
pub trait StoreEventListener: Send + Sync + 'static {
    fn on_event(&self, event: StoreEvent);
}

/// Pluggable persistence for session records.
///
/// Implementations backed by real I/O must be safe under concurrent calls for
/// distinct ids. Serializing operations against the same id is left to the store.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Get a record, `None` when absent or no longer valid.
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError>;

    /// Insert or replace a record.
    async fn set(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError>;

    /// Update only the cookie portion of an existing record. No-op if absent.
    async fn touch(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError>;

    async fn destroy(&self, id: &str) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;

    async fn length(&self) -> Result<usize, StorageError>;

    /// Register a listener for connectivity events. Stores whose availability never
    /// changes can keep the default.
    fn subscribe(&self, listener: Arc<dyn StoreEventListener>) {
        let _ = listener;
    }
}
