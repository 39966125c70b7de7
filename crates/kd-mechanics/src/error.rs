//! Error types for the mechanics engine.

use kd_core::DiceError;

/// Errors that can occur during mechanics operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A directive or expression is malformed.
    #[error("invalid format: {0}")]
    Format(String),

    /// A dice count or threshold is outside its allowed range.
    #[error("out of range: {0}")]
    Range(String),

    /// No explicit value was given and the attribute is not on the card.
    #[error("attribute '{attribute}' is not set on card '{card}'")]
    MissingAttribute {
        /// The card that was consulted.
        card: String,
        /// The canonical attribute name.
        attribute: String,
    },

    /// An expression still names something after attribute substitution.
    #[error("unknown attribute in expression: {0}")]
    UnknownAttribute(String),

    /// A reference value the check cannot be rolled against.
    #[error("invalid reference value: {0}")]
    InvalidReference(i64),

    /// The random source failed. The message is passed through verbatim.
    #[error("{0}")]
    RandomSource(#[from] DiceError),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
