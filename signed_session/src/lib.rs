//! signed-session - Signed-cookie session management for request/response pipelines
//!
//! A [`SessionContext`] attaches a signed session id cookie to each client, keeps the
//! session record in a pluggable [`SessionStore`] and exposes the session of the
//! request being handled to everything running inside [`SessionContext::provide`].

mod config;
mod context;
mod cookie;
mod session;
mod signature;
mod storage;
mod utils;

pub use config::{
    DEFAULT_SESSION_COOKIE_NAME, GenId, SESSION_COOKIE_NAME, SESSION_TRUST_PROXY, SessionOptions,
};

pub use context::{
    Connectivity, ConnectivityState, RequestMeta, SessionContext, TlsConnection,
};

pub use cookie::{CookieData, CookieOptions, DEFAULT_COOKIE_PATH, SameSite, SessionCookie};

pub use session::{Session, SessionError};

pub use signature::{sign, sign_cookie, unsign, unsign_cookie};

pub use storage::{
    MemoryStore, SessionRecord, SessionStore, StorageError, StoreEvent, StoreEventListener,
};

pub use utils::{UtilError, merge_headers};

pub use async_trait::async_trait;
