//! Initiative state for one channel.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{InitiativeError, InitiativeResult};

/// One named slot in the turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    /// Unique within the list.
    pub name: String,
    /// Initiative score (higher goes first).
    pub value: i64,
    /// Order of first insertion, used to break ties.
    pub insertion_seq: u64,
}

/// What [`InitiativeState::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new entry was appended.
    Inserted,
    /// An existing entry's value was replaced.
    Updated {
        /// The value it had before.
        previous: i64,
    },
}

/// One row of [`InitiativeState::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn<'a> {
    /// 1-based position in the display order.
    pub position: usize,
    /// The entry at that position.
    pub entry: &'a InitiativeEntry,
    /// Whether it is this entry's turn.
    pub is_current: bool,
}

/// The turn order of a single channel.
///
/// Entries are always kept in display order: value descending, then
/// insertion order ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeState {
    entries: Vec<InitiativeEntry>,
    current: usize,
    round: u32,
    next_seq: u64,
}

impl Default for InitiativeState {
    fn default() -> Self {
        Self::new()
    }
}

impl InitiativeState {
    /// Create an empty list in round 1.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            round: 1,
            next_seq: 0,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current round number (1-based).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// The entry whose turn it is.
    pub fn current(&self) -> Option<&InitiativeEntry> {
        self.entries.get(self.current)
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&InitiativeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Add an entry, or replace the value of an existing one.
    ///
    /// The entry whose turn it is stays current even if re-sorting moves it.
    pub fn add(&mut self, name: &str, value: i64) -> AddOutcome {
        let current_name = self.current().map(|e| e.name.clone());

        let outcome = match self.entries.iter_mut().find(|e| e.name == name) {
            // Re-adding keeps the original insertion_seq, so among equal
            // values the entry keeps its place in the tie order.
            Some(entry) => {
                let previous = entry.value;
                entry.value = value;
                AddOutcome::Updated { previous }
            }
            None => {
                self.entries.push(InitiativeEntry {
                    name: name.to_string(),
                    value,
                    insertion_seq: self.next_seq,
                });
                self.next_seq = self.next_seq.saturating_add(1);
                AddOutcome::Inserted
            }
        };

        self.sort();
        if let Some(current_name) = current_name {
            self.current = self
                .entries
                .iter()
                .position(|e| e.name == current_name)
                .unwrap_or(0);
        }
        tracing::debug!(name, value, ?outcome, "initiative entry added");
        outcome
    }

    /// Remove an entry by name. Returns `false` if there was none.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.name == name) else {
            return false;
        };
        self.entries.remove(pos);
        if self.entries.is_empty() {
            self.current = 0;
        } else {
            if pos < self.current {
                self.current -= 1;
            }
            self.current %= self.entries.len();
        }
        tracing::debug!(name, remaining = self.entries.len(), "initiative entry removed");
        true
    }

    /// Move to the next turn and return the entry now current.
    ///
    /// Wrapping past the last entry starts a new round.
    pub fn advance(&mut self) -> InitiativeResult<&InitiativeEntry> {
        if self.entries.is_empty() {
            return Err(InitiativeError::EmptyList);
        }
        self.current = (self.current + 1) % self.entries.len();
        if self.current == 0 {
            self.round = self.round.saturating_add(1);
        }
        let entry = &self.entries[self.current];
        tracing::debug!(name = %entry.name, round = self.round, "initiative advanced");
        Ok(entry)
    }

    /// Remove every entry and start again from round 1.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Entries in display order, marking the current one.
    pub fn list(&self) -> impl Iterator<Item = Turn<'_>> {
        self.entries.iter().enumerate().map(|(i, entry)| Turn {
            position: i + 1,
            entry,
            is_current: i == self.current,
        })
    }

    /// Encode the whole state as an opaque string.
    pub fn to_blob(&self) -> InitiativeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a string produced by [`InitiativeState::to_blob`].
    ///
    /// A blob that repeats an entry name is rejected.
    pub fn from_blob(blob: &str) -> InitiativeResult<Self> {
        let mut state: Self = serde_json::from_str(blob)?;
        let mut seen = HashSet::with_capacity(state.entries.len());
        if let Some(dup) = state.entries.iter().find(|e| !seen.insert(e.name.as_str())) {
            return Err(InitiativeError::DuplicateEntry(dup.name.clone()));
        }
        state.sort();
        if state.entries.is_empty() {
            state.current = 0;
        } else {
            state.current %= state.entries.len();
        }
        state.round = state.round.max(1);
        if let Some(max_seq) = state.entries.iter().map(|e| e.insertion_seq).max() {
            state.next_seq = state.next_seq.max(max_seq.saturating_add(1));
        }
        Ok(state)
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then(a.insertion_seq.cmp(&b.insertion_seq))
        });
    }
}
