//! # cs-app
//!
//! The ClipSafe application layer: the [`EncryptedStore`] that owns every
//! persisted credential and collection blob, and the [`Vault`] state machine
//! that mediates lock/unlock, encryption toggling, password rotation, and all
//! collection access.

pub mod error;
pub mod store;
pub mod vault;

pub use error::VaultError;
pub use store::EncryptedStore;
pub use vault::{Vault, VaultStatus};
