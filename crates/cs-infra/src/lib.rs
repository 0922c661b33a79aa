//! # cs-infra
//!
//! Infrastructure adapters for ClipSafe: the PBKDF2 + AES-GCM cipher, the
//! in-memory key-value store standing in for the platform persistence
//! backend, and the in-memory session holder.

pub mod crypto;
pub mod session;
pub mod storage;

pub use crypto::Pbkdf2AesGcmCipher;
pub use session::InMemorySession;
pub use storage::InMemoryStorage;
