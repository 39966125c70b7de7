//! Error types for the core crate.

/// Errors raised while parsing or evaluating a dice expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// The expression was empty.
    #[error("empty dice expression")]
    Empty,

    /// A character or token the grammar does not accept.
    #[error("unexpected '{found}' at position {position} in '{expression}'")]
    Unexpected {
        /// The offending text.
        found: String,
        /// Byte offset of the offending text.
        position: usize,
        /// The full expression.
        expression: String,
    },

    /// The expression ended where more input was required.
    #[error("dice expression '{0}' ended unexpectedly")]
    UnexpectedEnd(String),

    /// An integer literal did not fit.
    #[error("number too large: {0}")]
    NumberTooLarge(String),

    /// Die count outside the supported range.
    #[error("die count {0} out of range (1-{max})", max = crate::dice::MAX_DIE_COUNT)]
    DieCount(i64),

    /// Face count outside the supported range.
    #[error("die faces {0} out of range (1-{max})", max = crate::dice::MAX_FACES)]
    DieFaces(i64),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Arithmetic overflow while evaluating.
    #[error("arithmetic overflow")]
    Overflow,

    /// A scripted source ran out of faces.
    #[error("scripted dice exhausted")]
    Exhausted,

    /// A scripted face does not fit the die being rolled.
    #[error("scripted face {face} does not fit a d{faces}")]
    ScriptedFace {
        /// The scripted value.
        face: u32,
        /// The size of the die it was drawn for.
        faces: u32,
    },
}

/// Errors raised while loading engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration text was not valid TOML for [`crate::EngineConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised while loading a serialized character store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored JSON could not be decoded.
    #[error("corrupt character store: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The store could not be encoded as JSON.
    #[error("cannot encode character store: {0}")]
    Encode(serde_json::Error),
}
