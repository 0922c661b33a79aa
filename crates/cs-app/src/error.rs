//! Application-level error taxonomy.

use cs_core::ports::StorageError;
use cs_core::security::model::CipherError;
use cs_core::security::password::PasswordRuleError;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Malformed input. Surfaced before any persistence call; no state change.
    #[error("invalid input: {0}")]
    Validation(#[from] PasswordRuleError),

    /// Wrong password. Never distinguishes whether the salt, the stored
    /// verification data, or the password itself was at fault.
    #[error("incorrect password")]
    BadPassword,

    /// The operation needs a session key and none is held.
    #[error("vault is locked")]
    KeyAbsent,

    /// Persisted ciphertext failed to authenticate. The caller must treat the
    /// collection as unavailable rather than proceed with partial data.
    #[error("stored data failed to decrypt")]
    DecryptFailed,

    /// The requested transition is not legal in the current vault state.
    #[error("operation not available in the current vault state")]
    InvalidState,

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Cipher-side failure outside the authentication path (serialization,
    /// key material, randomness).
    #[error("cipher failure: {0}")]
    Cipher(#[source] CipherError),
}
