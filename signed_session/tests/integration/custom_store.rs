use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use signed_session::{
    CookieOptions, SessionContext, SessionOptions, SessionRecord, SessionStore, StorageError,
    StoreEvent, StoreEventListener, async_trait,
};

use crate::common::MockBrowser;

/// Store that can be switched into a failing mode and announces its own
/// connectivity changes.
#[derive(Default)]
struct FlakyStore {
    records: Mutex<HashMap<String, SessionRecord>>,
    failing: AtomicBool,
    reads: AtomicUsize,
    listeners: Mutex<Vec<Arc<dyn StoreEventListener>>>,
}

impl FlakyStore {
    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn announce(&self, event: StoreEvent) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener.on_event(event);
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Storage("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn set(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        self.check()?;
        self.records
            .lock()
            .unwrap()
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn touch(&self, id: &str, record: &SessionRecord) -> Result<(), StorageError> {
        self.check()?;
        if let Some(current) = self.records.lock().unwrap().get_mut(id) {
            current.cookie = record.cookie.clone();
        }
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), StorageError> {
        self.check()?;
        self.records.lock().unwrap().remove(id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        self.records.lock().unwrap().clear();
        Ok(())
    }

    async fn length(&self) -> Result<usize, StorageError> {
        Ok(self.records.lock().unwrap().len())
    }

    fn subscribe(&self, listener: Arc<dyn StoreEventListener>) {
        self.listeners.lock().unwrap().push(listener);
    }
}

fn context_on(store: Arc<FlakyStore>) -> SessionContext {
    SessionContext::new(
        SessionOptions::new("custom-store-secret")
            .with_cookie(CookieOptions::default().with_path("/"))
            .with_store(store),
    )
    .expect("valid options")
}

/// Read failures degrade to a new session instead of failing the request
#[tokio::test]
async fn test_read_failure_degrades_to_new_session() {
    let store = Arc::new(FlakyStore::default());
    let context = context_on(store.clone());
    let mut browser = MockBrowser::over_tls();

    let first = browser.visit(&context, "/").await.unwrap();

    store.fail(true);
    let during_outage = browser.visit(&context, "/").await.unwrap();
    assert_ne!(during_outage, first);

    store.fail(false);
    assert_eq!(store.length().await.unwrap(), 1);
}

/// Custom stores drive the connectivity state through `subscribe`
#[tokio::test]
async fn test_custom_store_disconnect_skips_sessions() {
    let store = Arc::new(FlakyStore::default());
    let context = context_on(store.clone());
    let mut browser = MockBrowser::over_tls();

    store.announce(StoreEvent::Disconnect);
    let id = browser.visit(&context, "/").await;

    assert_eq!(id, None);
    assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    assert_eq!(store.length().await.unwrap(), 0);

    store.announce(StoreEvent::Work);
    assert!(browser.visit(&context, "/").await.is_some());
}

/// Entity operations go straight to the custom store
#[tokio::test]
async fn test_entity_operations_use_custom_store() {
    let store = Arc::new(FlakyStore::default());
    let context = context_on(store.clone());

    let session = context
        .scope(async {
            let mut session = context.generate().unwrap();
            session.cookie_mut().set_max_age(90_000);
            session.save().await.unwrap();
            session.reload().await.unwrap();
            session
        })
        .await;

    assert_eq!(store.length().await.unwrap(), 1);
    session.destroy().await.unwrap();
    assert_eq!(store.length().await.unwrap(), 0);
}
