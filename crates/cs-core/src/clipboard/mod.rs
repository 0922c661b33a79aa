//! Clipboard domain models.

mod classify;
mod item;

pub use classify::classify_snippet;
pub use item::{Collection, Item, ItemKind};
