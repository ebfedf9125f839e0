mod errors;
mod memory;
mod traits;
mod types;

pub use errors::StorageError;
pub use memory::MemoryStore;
pub use traits::{SessionStore, StoreEventListener};
pub use types::{SessionRecord, StoreEvent};
