mod session_cookie;
mod types;

pub(crate) use session_cookie::expiry_after;
pub use session_cookie::SessionCookie;
pub use types::{CookieData, CookieOptions, DEFAULT_COOKIE_PATH, SameSite};
