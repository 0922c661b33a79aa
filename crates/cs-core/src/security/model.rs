//! Key material and envelope models.
//!
//! - Password -> KDF -> [`SessionKey`]
//! - [`SessionKey`] seals/opens [`Envelope`]s holding the collection blob and
//!   the verification sentinel.
//!
//! The session key is held only in memory while the vault is unlocked. It is
//! never serialized and is wiped on drop.

use std::fmt;

use rand::{rngs::OsRng, TryRngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Length of the derived key in bytes (256-bit AES-GCM key).
pub const KEY_LENGTH: usize = 32;

/// Length of the persisted salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Plaintext sentinel sealed into the verification envelope.
///
/// Opening the verification envelope and finding this marker is how password
/// correctness is tested without touching the real collection.
pub const VERIFICATION_MESSAGE: &str = "verified";

/// Errors from the cipher port and key material handling.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid key material")]
    InvalidKey,

    #[error("random generator failure")]
    CryptoFailure,

    #[error("failed to serialize plaintext")]
    SerializeFailed,

    #[error("encryption failed")]
    EncryptFailed,

    /// Wrong key, truncated envelope, or tampered ciphertext. Deliberately a
    /// single variant so callers cannot distinguish the cause.
    #[error("envelope failed to authenticate")]
    AuthenticationFailed,
}

/// Errors from the session port.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session key is held")]
    NoKey,
}

/// The derived encryption key cached for an unlocked session.
///
/// - Do NOT implement Serialize/Deserialize.
/// - Equality is constant-time.
/// - Wiped from memory on drop.
#[derive(Clone)]
pub struct SessionKey([u8; KEY_LENGTH]);

impl SessionKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| CipherError::InvalidKey)?;
        Ok(Self(key))
    }

    /// Avoid storing or logging this value. Use only for immediate cipher
    /// operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey([REDACTED])")
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A sealed ciphertext unit: base64(nonce || ciphertext || tag).
///
/// Opaque and bit-exact; the 12-byte nonce prefix is part of the persisted
/// wire format and must not change.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Envelope(String);

impl Envelope {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Envelope {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

/// Generate a fresh random salt for credential initialization.
pub fn generate_salt() -> Result<[u8; SALT_LENGTH], CipherError> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| CipherError::CryptoFailure)?;
    Ok(salt)
}
