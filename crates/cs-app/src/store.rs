//! Encrypted collection store.
//!
//! The sole component that touches the persisted credential material (`salt`,
//! `verification`, `useLock`) and the persisted collection blob (`savedData`).
//! Depending on the lock mode the collection is stored either as a sealed
//! envelope string or as a raw item array.
//!
//! Invariant: `salt` and `verification` are only ever written together, in a
//! single backend `set`, so a reader can never observe a salt that does not
//! correspond to the current verification envelope's key.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use cs_core::clipboard::Collection;
use cs_core::ports::storage::keys;
use cs_core::ports::{StorageBackend, VaultCipher};
use cs_core::security::model::{
    generate_salt, CipherError, Envelope, SessionKey, VERIFICATION_MESSAGE,
};
use cs_core::security::password::Password;

use crate::error::VaultError;

/// Presence of the persisted credential flags, used for state resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredFlags {
    /// A salt has been persisted at some point.
    pub has_salt: bool,
    /// The persisted `useLock` flag; `None` when it was never written.
    pub use_lock: Option<bool>,
}

pub struct EncryptedStore {
    storage: Arc<dyn StorageBackend>,
    cipher: Arc<dyn VaultCipher>,
}

impl EncryptedStore {
    pub fn new(storage: Arc<dyn StorageBackend>, cipher: Arc<dyn VaultCipher>) -> Self {
        Self { storage, cipher }
    }

    pub async fn flags(&self) -> Result<StoredFlags, VaultError> {
        let found = self.storage.get(&[keys::SALT, keys::USE_LOCK]).await?;
        Ok(StoredFlags {
            has_salt: found.contains_key(keys::SALT),
            use_lock: found.get(keys::USE_LOCK).and_then(Value::as_bool),
        })
    }

    pub async fn use_lock(&self) -> Result<bool, VaultError> {
        Ok(self.flags().await?.use_lock.unwrap_or(false))
    }

    /// Derive a candidate key from the stored salt and test it against the
    /// verification envelope.
    ///
    /// Every failure mode after the credential fetch collapses into
    /// [`VaultError::BadPassword`] so the caller learns nothing beyond "wrong
    /// password or corrupted data".
    pub async fn verify_password(&self, password: &Password) -> Result<SessionKey, VaultError> {
        let found = self
            .storage
            .get(&[keys::SALT, keys::VERIFICATION])
            .await?;

        let salt: Vec<u8> = found
            .get(keys::SALT)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .ok_or(VaultError::InvalidState)?;
        let verification = found
            .get(keys::VERIFICATION)
            .and_then(Value::as_str)
            .map(Envelope::new)
            .ok_or(VaultError::InvalidState)?;

        let key = self
            .cipher
            .derive_key(password, &salt)
            .await
            .map_err(VaultError::Cipher)?;

        let sentinel = self
            .cipher
            .open(&verification, &key)
            .await
            .map_err(|_| VaultError::BadPassword)?;
        if sentinel.get("message").and_then(Value::as_str) != Some(VERIFICATION_MESSAGE) {
            return Err(VaultError::BadPassword);
        }

        Ok(key)
    }

    /// Generate a fresh salt, derive a key for `password`, and persist the
    /// complete credential set - salt, verification envelope, sealed
    /// `items`, and `useLock: true` - in one backend write.
    ///
    /// Used for first-time setup, encryption enablement, and every password
    /// rotation. Nothing is written until every envelope has been computed,
    /// so a failure partway leaves the previous persisted state intact.
    pub async fn initialize_credentials(
        &self,
        password: &Password,
        items: &Collection,
    ) -> Result<SessionKey, VaultError> {
        let salt = generate_salt().map_err(VaultError::Cipher)?;
        let key = self
            .cipher
            .derive_key(password, &salt)
            .await
            .map_err(VaultError::Cipher)?;

        let verification = self
            .cipher
            .seal(&json!({ "message": VERIFICATION_MESSAGE }), &key)
            .await
            .map_err(VaultError::Cipher)?;
        let sealed_items = self
            .cipher
            .seal(&collection_value(items)?, &key)
            .await
            .map_err(VaultError::Cipher)?;

        self.storage
            .set(HashMap::from([
                (keys::SALT.to_string(), json!(salt.to_vec())),
                (
                    keys::VERIFICATION.to_string(),
                    json!(verification.as_str()),
                ),
                (keys::SAVED_DATA.to_string(), json!(sealed_items.as_str())),
                (keys::USE_LOCK.to_string(), json!(true)),
            ]))
            .await?;

        Ok(key)
    }

    /// Read the collection, decrypting it when the lock mode is on.
    ///
    /// An absent blob reads as an empty collection. A blob that fails to
    /// authenticate or parse is [`VaultError::DecryptFailed`]; callers must
    /// not proceed to a write in that case.
    pub async fn read_collection(
        &self,
        key: Option<&SessionKey>,
    ) -> Result<Collection, VaultError> {
        let found = self
            .storage
            .get(&[keys::USE_LOCK, keys::SAVED_DATA])
            .await?;
        let use_lock = found
            .get(keys::USE_LOCK)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let Some(saved) = found.get(keys::SAVED_DATA) else {
            return Ok(Collection::new());
        };

        if use_lock {
            let key = key.ok_or(VaultError::KeyAbsent)?;
            let envelope = saved
                .as_str()
                .map(Envelope::new)
                .ok_or(VaultError::DecryptFailed)?;
            let plaintext = self.cipher.open(&envelope, key).await.map_err(|err| {
                if err == CipherError::AuthenticationFailed {
                    tracing::warn!("collection envelope failed to authenticate");
                    VaultError::DecryptFailed
                } else {
                    VaultError::Cipher(err)
                }
            })?;
            serde_json::from_value(plaintext).map_err(|_| VaultError::DecryptFailed)
        } else {
            serde_json::from_value(saved.clone()).map_err(|_| VaultError::DecryptFailed)
        }
    }

    /// Persist the collection, sealed under `key` when the lock mode is on.
    pub async fn write_collection(
        &self,
        items: &Collection,
        key: Option<&SessionKey>,
    ) -> Result<(), VaultError> {
        let value = if self.use_lock().await? {
            let key = key.ok_or(VaultError::KeyAbsent)?;
            let sealed = self
                .cipher
                .seal(&collection_value(items)?, key)
                .await
                .map_err(VaultError::Cipher)?;
            json!(sealed.as_str())
        } else {
            collection_value(items)?
        };

        self.storage
            .set(HashMap::from([(keys::SAVED_DATA.to_string(), value)]))
            .await?;
        Ok(())
    }

    /// Persist `items` as plaintext, turn the lock flag off, and drop the now
    /// stale credential material.
    pub async fn write_plaintext_and_clear_credentials(
        &self,
        items: &Collection,
    ) -> Result<(), VaultError> {
        self.storage
            .set(HashMap::from([
                (keys::SAVED_DATA.to_string(), collection_value(items)?),
                (keys::USE_LOCK.to_string(), json!(false)),
            ]))
            .await?;
        self.storage
            .remove(&[keys::SALT, keys::VERIFICATION])
            .await?;
        Ok(())
    }

    pub async fn bytes_in_use(&self) -> Result<u64, VaultError> {
        Ok(self.storage.bytes_in_use().await?)
    }
}

fn collection_value(items: &Collection) -> Result<Value, VaultError> {
    serde_json::to_value(items).map_err(|_| VaultError::Cipher(CipherError::SerializeFailed))
}
