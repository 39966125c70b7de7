//! Character attribute storage.
//!
//! The engine only ever needs named integer attributes on named cards.
//! [`CharacterStore`] is the seam; [`MemoryStore`] is the in-process
//! implementation, serializable as JSON for hosts that want to keep it on disk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Read and write access to character attributes.
///
/// Callers pass names that have already been canonicalized.
pub trait CharacterStore {
    /// Read one attribute, or `None` if the card or attribute is missing.
    fn attribute(&self, card: &str, name: &str) -> Option<i64>;

    /// Write one attribute, creating the card if needed.
    ///
    /// Returns `false` only when `name` is new to the card and the card
    /// already holds `max_attributes` attributes.
    fn set_attribute(
        &mut self,
        card: &str,
        name: &str,
        value: i64,
        max_attributes: usize,
    ) -> bool;

    /// All attributes on a card, empty if the card does not exist.
    fn attributes(&self, card: &str) -> BTreeMap<String, i64>;
}

/// A single character card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCard {
    /// Attribute values keyed by canonical name.
    pub attributes: BTreeMap<String, i64>,
}

/// An in-memory [`CharacterStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    cards: BTreeMap<String, CharacterCard>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty card. Returns `false` if it already exists.
    pub fn create_card(&mut self, card: &str) -> bool {
        if self.cards.contains_key(card) {
            return false;
        }
        self.cards.insert(card.to_string(), CharacterCard::default());
        true
    }

    /// Delete a card. Returns `false` if it did not exist.
    pub fn delete_card(&mut self, card: &str) -> bool {
        self.cards.remove(card).is_some()
    }

    /// Look up a card.
    pub fn card(&self, card: &str) -> Option<&CharacterCard> {
        self.cards.get(card)
    }

    /// Names of all cards, sorted.
    pub fn card_names(&self) -> impl Iterator<Item = &str> {
        self.cards.keys().map(String::as_str)
    }

    /// Serialize the whole store as JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(StoreError::Encode)
    }

    /// Load a store previously written by [`MemoryStore::to_json`].
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CharacterStore for MemoryStore {
    fn attribute(&self, card: &str, name: &str) -> Option<i64> {
        self.cards.get(card)?.attributes.get(name).copied()
    }

    fn set_attribute(
        &mut self,
        card: &str,
        name: &str,
        value: i64,
        max_attributes: usize,
    ) -> bool {
        let entry = self.cards.entry(card.to_string()).or_default();
        if !entry.attributes.contains_key(name) && entry.attributes.len() >= max_attributes {
            tracing::warn!(card, attribute = name, max_attributes, "attribute cap reached");
            return false;
        }
        entry.attributes.insert(name.to_string(), value);
        true
    }

    fn attributes(&self, card: &str) -> BTreeMap<String, i64> {
        self.cards
            .get(card)
            .map(|c| c.attributes.clone())
            .unwrap_or_default()
    }
}
