//! PBKDF2 + AES-256-GCM cipher adapter.
//!
//! Wire format: base64(nonce || ciphertext || tag) with a 12-byte nonce and a
//! 16-byte GCM tag. Previously persisted envelopes use exactly this layout,
//! so the constants here must not change.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde_json::Value;
use sha2::Sha256;

use cs_core::ports::VaultCipher;
use cs_core::security::model::{CipherError, Envelope, SessionKey, KEY_LENGTH};
use cs_core::security::password::Password;

/// PBKDF2-HMAC-SHA256 iteration count. Fixed; changing it would orphan every
/// previously derived key.
const PBKDF2_ITERATIONS: u32 = 250_000;

const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

pub struct Pbkdf2AesGcmCipher;

#[async_trait]
impl VaultCipher for Pbkdf2AesGcmCipher {
    async fn derive_key(
        &self,
        password: &Password,
        salt: &[u8],
    ) -> Result<SessionKey, CipherError> {
        if salt.is_empty() {
            return Err(CipherError::InvalidKey);
        }

        let mut okm = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha256>(
            password.expose().as_bytes(),
            salt,
            PBKDF2_ITERATIONS,
            &mut okm,
        );
        SessionKey::from_bytes(&okm)
    }

    async fn seal(&self, plaintext: &Value, key: &SessionKey) -> Result<Envelope, CipherError> {
        let bytes = serde_json::to_vec(plaintext).map_err(|_| CipherError::SerializeFailed)?;

        let mut nonce = [0u8; NONCE_LENGTH];
        rand::rng().fill_bytes(&mut nonce);

        let cipher =
            Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKey)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), bytes.as_ref())
            .map_err(|_| CipherError::EncryptFailed)?;

        let mut combined = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(Envelope::new(BASE64.encode(combined)))
    }

    async fn open(&self, envelope: &Envelope, key: &SessionKey) -> Result<Value, CipherError> {
        let combined = BASE64
            .decode(envelope.as_str())
            .map_err(|_| CipherError::AuthenticationFailed)?;
        if combined.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CipherError::AuthenticationFailed);
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_LENGTH);

        let cipher =
            Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKey)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::AuthenticationFailed)?;

        serde_json::from_slice(&plaintext).map_err(|_| CipherError::AuthenticationFailed)
    }
}
