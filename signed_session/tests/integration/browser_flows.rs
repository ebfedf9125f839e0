use std::sync::Arc;
use std::time::Duration;

use signed_session::{
    CookieOptions, MemoryStore, SessionContext, SessionOptions, SessionStore, StoreEvent,
};

use crate::common::MockBrowser;

fn context(cookie: CookieOptions) -> (SessionContext, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let context = SessionContext::new(
        SessionOptions::new("integration-secret")
            .with_name("connect.sid")
            .with_cookie(cookie)
            .with_store(store.clone()),
    )
    .expect("valid options");
    (context, store)
}

/// A returning browser keeps its session across visits
#[tokio::test]
async fn test_browser_keeps_session_across_visits() {
    let (context, store) = context(CookieOptions::default());
    let mut browser = MockBrowser::over_tls();

    let first = browser.visit(&context, "/").await;
    let second = browser.visit(&context, "/account").await;
    let third = browser.visit(&context, "/account/settings").await;

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(store.length().await.unwrap(), 1);
}

/// Two browsers never share a session
#[tokio::test]
async fn test_browsers_are_isolated() {
    let (context, store) = context(CookieOptions::default());
    let mut alice = MockBrowser::over_tls();
    let mut bob = MockBrowser::over_tls();

    let alice_id = alice.visit(&context, "/").await;
    let bob_id = bob.visit(&context, "/").await;

    assert_ne!(alice_id, bob_id);
    assert_eq!(alice.visit(&context, "/").await, alice_id);
    assert_eq!(bob.visit(&context, "/").await, bob_id);
    assert_eq!(store.length().await.unwrap(), 2);
}

/// A forged cookie never resolves to somebody else's session
#[tokio::test]
async fn test_forged_cookie_gets_fresh_session() {
    let (context, _store) = context(CookieOptions::default());
    let mut victim = MockBrowser::over_tls();
    let victim_id = victim.visit(&context, "/").await.unwrap();

    let mut attacker = MockBrowser::over_tls();
    attacker.set_cookie("connect.sid", &format!("s%3A{victim_id}.forgedsignature"));
    let attacker_id = attacker.visit(&context, "/").await.unwrap();

    assert_ne!(attacker_id, victim_id);
}

/// Losing the cookie starts over with a new session
#[tokio::test]
async fn test_forgotten_cookie_starts_new_session() {
    let (context, _store) = context(CookieOptions::default());
    let mut browser = MockBrowser::over_tls();

    let first = browser.visit(&context, "/").await;
    browser.forget();
    let second = browser.visit(&context, "/").await;

    assert_ne!(first, second);
}

/// Expired sessions are replaced and their records purged
#[tokio::test]
async fn test_session_expires_after_max_age() {
    let (context, store) = context(CookieOptions::default().with_max_age(500));
    let mut browser = MockBrowser::over_tls();

    let first = browser.visit(&context, "/").await.unwrap();
    let stale_cookie = browser.cookie("connect.sid").unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(1000)).await;

    let mut replay = MockBrowser::over_tls();
    replay.set_cookie("connect.sid", &stale_cookie);
    let second = replay.visit(&context, "/").await.unwrap();

    assert_ne!(first, second);
    assert!(store.get(&first).await.unwrap().is_none());
}

/// Secure cookies are withheld from plain-text connections
#[tokio::test]
async fn test_plain_http_browser_never_receives_secure_cookie() {
    let (context, store) = context(CookieOptions::default());
    let mut browser = MockBrowser::new();

    browser.visit(&context, "/").await;

    assert!(browser.cookie("connect.sid").is_none());
    assert_eq!(store.length().await.unwrap(), 1);
}

/// Requests parked behind a blocked store continue once it works again
#[tokio::test]
async fn test_blocked_store_then_work() {
    let (context, store) = context(CookieOptions::default());
    store.emit(StoreEvent::Block);

    let visits: Vec<_> = (0..4)
        .map(|_| {
            let context = context.clone();
            tokio::spawn(async move {
                let mut browser = MockBrowser::over_tls();
                browser.visit(&context, "/").await
            })
        })
        .collect();

    for _ in 0..200 {
        if context.connectivity().pending_waiters() == 4 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(context.connectivity().pending_waiters(), 4);

    store.emit(StoreEvent::Work);

    for visit in visits {
        assert!(visit.await.unwrap().is_some());
    }
    assert_eq!(store.length().await.unwrap(), 4);
}
