//! # cs-core
//!
//! Core domain models and business logic for ClipSafe.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: the clipboard item model, the security domain models, and
//! the ports the application layer drives its adapters through.

pub mod clipboard;
pub mod ports;
pub mod security;

// Re-export commonly used types at the crate root
pub use clipboard::{classify_snippet, Collection, Item, ItemKind};
pub use security::model::{Envelope, SessionKey};
pub use security::password::Password;
