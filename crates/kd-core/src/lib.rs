//! Core vocabulary for the koidice tabletop engine.
//!
//! Provides the canonical attribute catalog, dice notation with pluggable
//! random sources, character attribute storage, and engine configuration.

pub mod attribute;
pub mod config;
pub mod dice;
pub mod error;
pub mod store;

pub use attribute::{AttributeCatalog, standard_catalog};
pub use config::EngineConfig;
pub use dice::{DiceRoller, RandomSource, Roll, ScriptedDice};
pub use error::{ConfigError, DiceError, StoreError};
pub use store::{CharacterCard, CharacterStore, MemoryStore};
