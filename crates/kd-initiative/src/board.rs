//! Per-channel initiative host.

use kd_core::{RandomSource, Roll};

use crate::error::InitiativeResult;
use crate::roll::InitiativeRoll;
use crate::state::{AddOutcome, InitiativeEntry, InitiativeState};
use crate::store::BlobStore;

/// The entry that just got the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnChange {
    /// The entry now acting.
    pub entry: InitiativeEntry,
    /// The round it is acting in.
    pub round: u32,
}

/// The result of an initiative roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolledInitiative {
    /// The entry's name.
    pub name: String,
    /// The value and how it was obtained.
    pub roll: Roll,
    /// Whether the entry was new.
    pub outcome: AddOutcome,
}

/// Initiative lists for many channels, persisted through a [`BlobStore`].
///
/// Every operation loads the channel, changes it and saves it back. An
/// emptied list is deleted from the store rather than saved.
#[derive(Debug, Clone, Default)]
pub struct InitiativeBoard<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> InitiativeBoard<S> {
    /// Wrap a blob store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load a channel's state. A channel with no blob is an empty list.
    pub fn load(&self, channel: &str) -> InitiativeResult<InitiativeState> {
        match self.store.get(channel)? {
            Some(blob) => InitiativeState::from_blob(&blob),
            None => Ok(InitiativeState::new()),
        }
    }

    fn save(&mut self, channel: &str, state: &InitiativeState) -> InitiativeResult<()> {
        if state.is_empty() {
            self.store.delete(channel)?;
            tracing::debug!(channel, "initiative list deleted");
        } else {
            self.store.put(channel, &state.to_blob()?)?;
            tracing::debug!(channel, entries = state.len(), "initiative list saved");
        }
        Ok(())
    }

    /// Add an entry with a known value, or update an existing one.
    pub fn add(
        &mut self,
        channel: &str,
        name: &str,
        value: i64,
    ) -> InitiativeResult<(AddOutcome, InitiativeState)> {
        let mut state = self.load(channel)?;
        let outcome = state.add(name, value);
        self.save(channel, &state)?;
        Ok((outcome, state))
    }

    /// Roll initiative and add the result.
    ///
    /// A failed roll leaves the channel untouched.
    pub fn roll(
        &mut self,
        channel: &str,
        roll: &InitiativeRoll,
        dice: &mut dyn RandomSource,
    ) -> InitiativeResult<(RolledInitiative, InitiativeState)> {
        let mut state = self.load(channel)?;
        let result = roll.evaluate(dice)?;
        let outcome = state.add(&roll.name, result.total);
        self.save(channel, &state)?;
        Ok((
            RolledInitiative {
                name: roll.name.clone(),
                roll: result,
                outcome,
            },
            state,
        ))
    }

    /// Remove an entry. Returns `None` if the name was not in the list.
    pub fn remove(
        &mut self,
        channel: &str,
        name: &str,
    ) -> InitiativeResult<Option<InitiativeState>> {
        let mut state = self.load(channel)?;
        if !state.remove(name) {
            return Ok(None);
        }
        self.save(channel, &state)?;
        Ok(Some(state))
    }

    /// Pass the turn to the next entry.
    pub fn advance(&mut self, channel: &str) -> InitiativeResult<(TurnChange, InitiativeState)> {
        let mut state = self.load(channel)?;
        let entry = state.advance()?.clone();
        self.save(channel, &state)?;
        let change = TurnChange {
            entry,
            round: state.round(),
        };
        Ok((change, state))
    }

    /// Clear a channel. Returns `false` if it was already empty.
    pub fn clear(&mut self, channel: &str) -> InitiativeResult<bool> {
        let had_entries = !self.load(channel)?.is_empty();
        self.store.delete(channel)?;
        Ok(had_entries)
    }
}
