//! Axum integration for the signed-session middleware.
//!
//! ```no_run
//! use axum::{Router, middleware, routing::get};
//! use signed_session_axum::{CurrentSession, SessionContext, SessionOptions, provide_session};
//!
//! async fn index(session: CurrentSession) -> String {
//!     format!("session {}", session.id())
//! }
//!
//! let context = SessionContext::new(SessionOptions::new("keyboard cat")).unwrap();
//! let app: Router = Router::new()
//!     .route("/", get(index))
//!     .layer(middleware::from_fn_with_state(context, provide_session));
//! ```

mod error;
mod middleware;
mod session;

pub use error::IntoResponseError;
pub use middleware::provide_session;
pub use session::{CurrentSession, SessionRejection};

// Re-export the core types so applications only depend on this crate
pub use signed_session::{
    CookieOptions, MemoryStore, SameSite, Session, SessionContext, SessionCookie, SessionError,
    SessionOptions, SessionRecord, SessionStore, StorageError, StoreEvent, StoreEventListener,
    TlsConnection, async_trait,
};
