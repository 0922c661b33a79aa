//! In-memory session key holder.

use async_trait::async_trait;
use tokio::sync::RwLock;

use cs_core::ports::SessionStore;
use cs_core::security::model::{SessionError, SessionKey};

pub struct InMemorySession {
    key: RwLock<Option<SessionKey>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self {
            key: RwLock::new(None),
        }
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySession {
    async fn is_ready(&self) -> bool {
        self.key.read().await.is_some()
    }

    async fn get_key(&self) -> Result<SessionKey, SessionError> {
        self.key.read().await.clone().ok_or(SessionError::NoKey)
    }

    async fn set_key(&self, key: SessionKey) {
        *self.key.write().await = Some(key);
    }

    async fn clear(&self) {
        *self.key.write().await = None;
    }
}
