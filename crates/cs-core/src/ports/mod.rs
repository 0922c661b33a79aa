//! Ports: the async interfaces the application layer drives adapters through.

pub mod cipher;
pub mod session;
pub mod storage;

pub use cipher::VaultCipher;
pub use session::SessionStore;
pub use storage::{StorageBackend, StorageError};
