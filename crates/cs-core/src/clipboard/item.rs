//! Clipboard item domain model.
//!
//! An [`Item`] is one captured clipboard entry; a [`Collection`] is the
//! newest-first ordered history the vault persists as a single blob.
//!
//! The serde shape (`type` field, lowercase kind tags) is the persisted wire
//! format and must stay stable across versions.

use serde::{Deserialize, Serialize};

/// What kind of content an item holds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Plain text.
    Text,
    /// Source code, as classified by the paste heuristic.
    Code,
    /// An HTML table fragment.
    Table,
    /// An image as a data URL.
    Image,
}

/// One clipboard entry. Created on paste or manual entry, never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub content: String,
}

impl Item {
    pub fn new(kind: ItemKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// The ordered clipboard history, newest first.
///
/// Insertion deduplicates on `(kind, content)` equality so repeated pastes of
/// the same content leave the history unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Collection(Vec<Item>);

impl Collection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.get(index)
    }

    /// Prepend `item` unless an equal `(kind, content)` entry already exists.
    ///
    /// Returns `true` if the collection changed.
    pub fn insert_front(&mut self, item: Item) -> bool {
        if self
            .0
            .iter()
            .any(|existing| existing.kind == item.kind && existing.content == item.content)
        {
            return false;
        }
        self.0.insert(0, item);
        true
    }

    /// Remove the entry at `index`, preserving the order of the rest.
    ///
    /// Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Item> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }
}

impl From<Vec<Item>> for Collection {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
