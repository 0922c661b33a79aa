//! Cipher port - key derivation and authenticated encryption.

use async_trait::async_trait;
use serde_json::Value;

use crate::security::model::{CipherError, Envelope, SessionKey};
use crate::security::password::Password;

#[async_trait]
pub trait VaultCipher: Send + Sync {
    /// Derive the symmetric key for `password` and `salt`.
    ///
    /// Semantics:
    /// - Deterministic: same (password, salt) => same key
    /// - Heavy operation (password-based KDF)
    async fn derive_key(&self, password: &Password, salt: &[u8])
        -> Result<SessionKey, CipherError>;

    /// Serialize `plaintext` canonically and seal it under `key` with a fresh
    /// nonce. Nonce reuse under the same key is a critical violation; every
    /// call must draw new randomness.
    async fn seal(&self, plaintext: &Value, key: &SessionKey) -> Result<Envelope, CipherError>;

    /// Open `envelope` under `key` and parse the plaintext back into a value.
    ///
    /// Failure mapping: wrong key, truncation, and tampering all surface as
    /// [`CipherError::AuthenticationFailed`].
    async fn open(&self, envelope: &Envelope, key: &SessionKey) -> Result<Value, CipherError>;
}
