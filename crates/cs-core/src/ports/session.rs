//! Session port - holds the key for the current unlocked session.
//!
//! Single writer (the vault state machine sets and clears it), any number of
//! readers. The key lives only in memory and is dropped on re-lock.

use async_trait::async_trait;

use crate::security::model::{SessionError, SessionKey};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Whether a session key is currently held.
    async fn is_ready(&self) -> bool;

    /// The session key, or [`SessionError::NoKey`] when locked.
    async fn get_key(&self) -> Result<SessionKey, SessionError>;

    /// Cache `key` for the session, replacing any previous key.
    async fn set_key(&self, key: SessionKey);

    /// Drop the session key.
    async fn clear(&self);
}
