mod core;
mod errors;

pub use self::core::Session;
pub use errors::SessionError;
