//! Initiative tracking for the koidice engine.
//!
//! Each channel owns an independent turn order ([`InitiativeState`]). The
//! [`InitiativeBoard`] loads a channel from a [`BlobStore`], applies one
//! operation and writes it back. Callers must not run two operations on the
//! same channel at once; `&mut self` on the board enforces that within one
//! process.

pub mod board;
pub mod error;
pub mod roll;
pub mod state;
pub mod store;

pub use board::{InitiativeBoard, RolledInitiative, TurnChange};
pub use error::{InitiativeError, InitiativeResult};
pub use roll::{InitiativeRoll, InitiativeValue};
pub use state::{AddOutcome, InitiativeEntry, InitiativeState, Turn};
pub use store::{BlobStore, MemoryBlobStore};
