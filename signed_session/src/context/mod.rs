mod connectivity;
mod provider;
mod request;
mod slot;

pub use connectivity::{Connectivity, ConnectivityState};
pub use provider::SessionContext;
pub use request::{RequestMeta, TlsConnection};
