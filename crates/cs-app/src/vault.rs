//! Vault state machine.
//!
//! States:
//! - `FirstRun`: nothing persisted yet; a password must be set (or the vault
//!   used without one).
//! - `Locked` / `Unlocked`: the lock mode is on; `Unlocked` means a session
//!   key is held.
//! - `EncryptionDisabled`: the collection is persisted as plaintext; no
//!   password and no key are involved.
//!
//! Every collection read-modify-write sequence awaits internally, so two
//! concurrent mutations could otherwise interleave between the read and the
//! write and lose an update. One `tokio::sync::Mutex` serializes them all.

use std::sync::Arc;

use tokio::sync::Mutex;

use cs_core::clipboard::{Collection, Item};
use cs_core::ports::{SessionStore, StorageBackend, VaultCipher};
use cs_core::security::model::SessionKey;
use cs_core::security::password::{Password, PasswordRuleError};

use crate::error::VaultError;
use crate::store::EncryptedStore;

/// Where the vault currently stands, derived from persisted flags plus the
/// in-memory session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    /// No salt and no lock flag have ever been persisted.
    FirstRun,
    /// Lock mode is on and no session key is held.
    Locked,
    /// Lock mode is on and a session key is held.
    Unlocked,
    /// Lock mode is off; the collection is stored as plaintext.
    EncryptionDisabled,
}

pub struct Vault {
    store: EncryptedStore,
    session: Arc<dyn SessionStore>,
    collection_lock: Mutex<()>,
}

impl Vault {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        cipher: Arc<dyn VaultCipher>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            store: EncryptedStore::new(storage, cipher),
            session,
            collection_lock: Mutex::new(()),
        }
    }

    pub async fn status(&self) -> Result<VaultStatus, VaultError> {
        let flags = self.store.flags().await?;
        let status = match flags.use_lock {
            Some(true) => {
                if self.session.is_ready().await {
                    VaultStatus::Unlocked
                } else {
                    VaultStatus::Locked
                }
            }
            Some(false) => VaultStatus::EncryptionDisabled,
            None => {
                if flags.has_salt {
                    VaultStatus::EncryptionDisabled
                } else {
                    VaultStatus::FirstRun
                }
            }
        };
        Ok(status)
    }

    /// First-time setup: set the initial password and turn the lock mode on.
    pub async fn set_initial_password(&self, password: &Password) -> Result<(), VaultError> {
        if self.status().await? != VaultStatus::FirstRun {
            return Err(VaultError::InvalidState);
        }
        password.validate()?;

        let _guard = self.collection_lock.lock().await;
        let items = self.store.read_collection(None).await?;
        let key = self.store.initialize_credentials(password, &items).await?;
        self.session.set_key(key).await;
        tracing::debug!("vault initialized, lock mode enabled");
        Ok(())
    }

    /// Unlock with `password`, caching the derived key for the session.
    ///
    /// An empty password is a validation error, not an authentication
    /// attempt; an authentication failure leaves the vault locked.
    pub async fn unlock(&self, password: &Password) -> Result<(), VaultError> {
        if password.is_empty() {
            return Err(VaultError::Validation(PasswordRuleError::Empty));
        }
        if !self.store.use_lock().await? {
            return Err(VaultError::InvalidState);
        }

        let key = self.store.verify_password(password).await?;
        self.session.set_key(key).await;
        tracing::debug!("vault unlocked");
        Ok(())
    }

    /// Drop the session key. Always available, never fails.
    pub async fn lock(&self) {
        self.session.clear().await;
        tracing::debug!("vault locked");
    }

    /// Turn the lock mode on for a vault currently storing plaintext,
    /// re-encrypting the existing collection from scratch.
    ///
    /// The new ciphertext is fully computed before anything is written, so a
    /// failure partway leaves the plaintext state intact.
    pub async fn enable(&self, password: &Password) -> Result<(), VaultError> {
        if self.status().await? != VaultStatus::EncryptionDisabled {
            return Err(VaultError::InvalidState);
        }
        password.validate()?;

        let _guard = self.collection_lock.lock().await;
        let items = self.store.read_collection(None).await?;
        let key = self.store.initialize_credentials(password, &items).await?;
        self.session.set_key(key).await;
        tracing::debug!("lock mode enabled");
        Ok(())
    }

    /// Turn the lock mode off: decrypt the collection under the session key,
    /// persist it as plaintext, and drop the session key.
    pub async fn disable(&self) -> Result<(), VaultError> {
        if !self.store.use_lock().await? {
            return Err(VaultError::InvalidState);
        }
        let key = self
            .session
            .get_key()
            .await
            .map_err(|_| VaultError::KeyAbsent)?;

        let _guard = self.collection_lock.lock().await;
        let items = self.store.read_collection(Some(&key)).await?;
        self.store
            .write_plaintext_and_clear_credentials(&items)
            .await?;
        self.session.clear().await;
        tracing::debug!("lock mode disabled");
        Ok(())
    }

    /// Rotate the password for an unlocked vault.
    ///
    /// `old` must verify against the persisted credentials *and* match the
    /// key that unlocked this session. A failure at any step before the final
    /// write leaves the previous credential set persisted.
    pub async fn change_password(&self, old: &Password, new: &Password) -> Result<(), VaultError> {
        if old.is_empty() {
            return Err(VaultError::Validation(PasswordRuleError::Empty));
        }
        new.validate()?;
        if !self.store.use_lock().await? {
            return Err(VaultError::InvalidState);
        }
        let session_key = self
            .session
            .get_key()
            .await
            .map_err(|_| VaultError::KeyAbsent)?;

        let candidate = self.store.verify_password(old).await?;
        if candidate != session_key {
            return Err(VaultError::BadPassword);
        }

        let _guard = self.collection_lock.lock().await;
        let items = self.store.read_collection(Some(&session_key)).await?;
        let new_key = self.store.initialize_credentials(new, &items).await?;
        self.session.set_key(new_key).await;
        tracing::debug!("password rotated");
        Ok(())
    }

    /// Add one clipboard item, deduplicating on `(kind, content)`.
    ///
    /// Returns the resulting collection snapshot.
    pub async fn add_item(&self, item: Item) -> Result<Collection, VaultError> {
        let _guard = self.collection_lock.lock().await;
        let key = self.key_for_mode().await?;
        let mut items = self.store.read_collection(key.as_ref()).await?;
        if items.insert_front(item) {
            self.store.write_collection(&items, key.as_ref()).await?;
        }
        Ok(items)
    }

    /// Delete the item at `index`. Out-of-range indices are a no-op.
    ///
    /// Returns the resulting collection snapshot.
    pub async fn delete_item(&self, index: usize) -> Result<Collection, VaultError> {
        let _guard = self.collection_lock.lock().await;
        let key = self.key_for_mode().await?;
        let mut items = self.store.read_collection(key.as_ref()).await?;
        if items.remove(index).is_some() {
            self.store.write_collection(&items, key.as_ref()).await?;
        }
        Ok(items)
    }

    /// A snapshot of the current collection.
    pub async fn items(&self) -> Result<Collection, VaultError> {
        let _guard = self.collection_lock.lock().await;
        let key = self.key_for_mode().await?;
        self.store.read_collection(key.as_ref()).await
    }

    /// Bytes currently used by the persistence backend.
    pub async fn storage_usage(&self) -> Result<u64, VaultError> {
        self.store.bytes_in_use().await
    }

    /// The key collection access needs in the current mode: the session key
    /// when the lock mode is on, none when storing plaintext.
    async fn key_for_mode(&self) -> Result<Option<SessionKey>, VaultError> {
        if self.store.use_lock().await? {
            let key = self
                .session
                .get_key()
                .await
                .map_err(|_| VaultError::KeyAbsent)?;
            Ok(Some(key))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::clipboard::ItemKind;
    use cs_infra::{InMemorySession, InMemoryStorage, Pbkdf2AesGcmCipher};

    fn vault() -> Vault {
        Vault::new(
            Arc::new(InMemoryStorage::new()),
            Arc::new(Pbkdf2AesGcmCipher),
            Arc::new(InMemorySession::new()),
        )
    }

    #[tokio::test]
    async fn fresh_vault_starts_in_first_run() {
        let vault = vault();
        assert_eq!(vault.status().await.expect("status"), VaultStatus::FirstRun);
    }

    #[tokio::test]
    async fn set_initial_password_enters_unlocked() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("abcd"))
            .await
            .expect("set initial password");

        assert_eq!(vault.status().await.expect("status"), VaultStatus::Unlocked);
    }

    #[tokio::test]
    async fn set_initial_password_rejects_short_passwords_without_state_change() {
        let vault = vault();
        let err = vault
            .set_initial_password(&Password::new("ab"))
            .await
            .expect_err("expected Validation");

        assert!(matches!(err, VaultError::Validation(_)));
        assert_eq!(vault.status().await.expect("status"), VaultStatus::FirstRun);
    }

    #[tokio::test]
    async fn set_initial_password_is_first_run_only() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("abcd"))
            .await
            .expect("set initial password");

        let err = vault
            .set_initial_password(&Password::new("efgh"))
            .await
            .expect_err("expected InvalidState");
        assert!(matches!(err, VaultError::InvalidState));
    }

    #[tokio::test]
    async fn lock_then_unlock_round_trip() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("abcd"))
            .await
            .expect("set initial password");
        vault
            .add_item(Item::new(ItemKind::Text, "hello"))
            .await
            .expect("add item");

        vault.lock().await;
        assert_eq!(vault.status().await.expect("status"), VaultStatus::Locked);
        let err = vault.items().await.expect_err("locked read must fail");
        assert!(matches!(err, VaultError::KeyAbsent));

        vault
            .unlock(&Password::new("abcd"))
            .await
            .expect("unlock with correct password");
        let items = vault.items().await.expect("read after unlock");
        assert_eq!(items.len(), 1);
        assert_eq!(items.items()[0], Item::new(ItemKind::Text, "hello"));
    }

    #[tokio::test]
    async fn unlock_with_wrong_password_stays_locked() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("abcd"))
            .await
            .expect("set initial password");
        vault.lock().await;

        let err = vault
            .unlock(&Password::new("nope"))
            .await
            .expect_err("expected BadPassword");
        assert!(matches!(err, VaultError::BadPassword));
        assert_eq!(vault.status().await.expect("status"), VaultStatus::Locked);
    }

    #[tokio::test]
    async fn unlock_with_empty_password_is_a_validation_error() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("abcd"))
            .await
            .expect("set initial password");
        vault.lock().await;

        let err = vault
            .unlock(&Password::new(""))
            .await
            .expect_err("expected Validation");
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn add_item_dedups_on_kind_and_content() {
        let vault = vault();
        vault
            .add_item(Item::new(ItemKind::Text, "dup"))
            .await
            .expect("first add");
        let items = vault
            .add_item(Item::new(ItemKind::Text, "dup"))
            .await
            .expect("duplicate add");

        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn delete_item_out_of_range_is_a_noop() {
        let vault = vault();
        vault
            .add_item(Item::new(ItemKind::Text, "only"))
            .await
            .expect("add");

        let items = vault.delete_item(9).await.expect("out-of-range delete");
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn delete_item_preserves_order_of_the_rest() {
        let vault = vault();
        for content in ["a", "b", "c"] {
            vault
                .add_item(Item::new(ItemKind::Text, content))
                .await
                .expect("add");
        }

        // Newest first: ["c", "b", "a"]; drop "b".
        let items = vault.delete_item(1).await.expect("delete");
        let contents: Vec<&str> = items.items().iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, ["c", "a"]);
    }

    #[tokio::test]
    async fn enable_then_disable_preserves_items() {
        let vault = vault();
        vault
            .add_item(Item::new(ItemKind::Text, "one"))
            .await
            .expect("add");
        vault
            .add_item(Item::new(ItemKind::Code, "let two = 2;"))
            .await
            .expect("add");
        let before = vault.items().await.expect("read");

        // enable() requires the explicit disabled state, so reach it through
        // set_initial_password + disable first.
        vault
            .set_initial_password(&Password::new("pass-123"))
            .await
            .expect("set password");
        vault.disable().await.expect("disable");
        assert_eq!(
            vault.status().await.expect("status"),
            VaultStatus::EncryptionDisabled
        );

        vault
            .enable(&Password::new("pass-456"))
            .await
            .expect("enable");
        assert_eq!(vault.status().await.expect("status"), VaultStatus::Unlocked);

        vault.disable().await.expect("disable again");
        let after = vault.items().await.expect("read plaintext");
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn disable_requires_a_session_key() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("abcd"))
            .await
            .expect("set password");
        vault.lock().await;

        let err = vault.disable().await.expect_err("expected KeyAbsent");
        assert!(matches!(err, VaultError::KeyAbsent));
    }

    #[tokio::test]
    async fn change_password_swaps_which_password_unlocks() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("old-pass"))
            .await
            .expect("set password");
        vault
            .add_item(Item::new(ItemKind::Text, "carried"))
            .await
            .expect("add");

        vault
            .change_password(&Password::new("old-pass"), &Password::new("new-pass"))
            .await
            .expect("rotate");

        vault.lock().await;
        let err = vault
            .unlock(&Password::new("old-pass"))
            .await
            .expect_err("old password must no longer unlock");
        assert!(matches!(err, VaultError::BadPassword));

        vault
            .unlock(&Password::new("new-pass"))
            .await
            .expect("new password unlocks");
        let items = vault.items().await.expect("read");
        assert_eq!(items.items()[0].content, "carried");
    }

    #[tokio::test]
    async fn change_password_with_wrong_old_leaves_credentials_untouched() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("old-pass"))
            .await
            .expect("set password");

        let err = vault
            .change_password(&Password::new("not-old"), &Password::new("new-pass"))
            .await
            .expect_err("expected BadPassword");
        assert!(matches!(err, VaultError::BadPassword));

        vault.lock().await;
        vault
            .unlock(&Password::new("old-pass"))
            .await
            .expect("old password still unlocks");
    }

    #[tokio::test]
    async fn change_password_validates_the_new_password_first() {
        let vault = vault();
        vault
            .set_initial_password(&Password::new("old-pass"))
            .await
            .expect("set password");

        let err = vault
            .change_password(&Password::new("old-pass"), &Password::new("ab"))
            .await
            .expect_err("expected Validation");
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_adds_do_not_lose_updates() {
        let vault = Arc::new(vault());

        let mut handles = Vec::new();
        for n in 0..8 {
            let vault = vault.clone();
            handles.push(tokio::spawn(async move {
                vault
                    .add_item(Item::new(ItemKind::Text, format!("item-{n}")))
                    .await
                    .expect("concurrent add");
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        let items = vault.items().await.expect("read");
        assert_eq!(items.len(), 8);
    }

    #[tokio::test]
    async fn storage_usage_reflects_persisted_data() {
        let vault = vault();
        let empty = vault.storage_usage().await.expect("usage");
        vault
            .add_item(Item::new(ItemKind::Text, "some content"))
            .await
            .expect("add");

        let used = vault.storage_usage().await.expect("usage");
        assert!(used > empty);
    }
}
