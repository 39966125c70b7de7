//! Dice notation and random sources.
//!
//! Every random draw in the engine goes through a [`RandomSource`]. Two
//! implementations ship here: [`DiceRoller`] backed by a seedable RNG, and
//! [`ScriptedDice`] which replays a fixed list of faces so that any outcome
//! can be reproduced exactly.

pub mod expr;
pub mod source;

pub use expr::{Expr, parse};
pub use source::{DiceRoller, ScriptedDice};

use serde::{Deserialize, Serialize};

use crate::error::DiceError;

/// Largest number of dice a single term may roll.
pub const MAX_DIE_COUNT: u32 = 1000;

/// Largest die size a term may roll.
pub const MAX_FACES: u32 = 10_000;

/// The result of evaluating a dice expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    /// The final value.
    pub total: i64,
    /// Human-readable breakdown, e.g. `1D6+2=4+2=6`.
    pub detail: String,
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail)
    }
}

/// Evaluates dice notation against some source of randomness.
pub trait RandomSource {
    /// Draw a single face in `1..=faces`.
    fn draw(&mut self, faces: u32) -> Result<u32, DiceError>;

    /// Evaluate a dice expression. `default_faces` sizes dice written without
    /// an explicit face count (`2d`, `d`).
    fn roll(&mut self, expression: &str, default_faces: u32) -> Result<Roll, DiceError> {
        let expr = parse(expression)?;
        let mut draw = |faces: u32| self.draw(faces);
        expr.evaluate(default_faces, &mut draw)
    }

    /// The highest value the expression can produce, or `None` if it does not
    /// evaluate. Never consumes randomness.
    fn max_value(&self, expression: &str, default_faces: u32) -> Option<i64> {
        parse(expression).ok()?.max_value(default_faces).ok()
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn draw(&mut self, faces: u32) -> Result<u32, DiceError> {
        (**self).draw(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_value_of_invalid_expression_is_none() {
        let dice = ScriptedDice::new([]);
        assert_eq!(dice.max_value("1d6", 100), Some(6));
        assert_eq!(dice.max_value("1dx", 100), None);
        assert_eq!(dice.max_value("", 100), None);
    }

    #[test]
    fn roll_display_is_detail() {
        let mut dice = ScriptedDice::new([3]);
        let roll = dice.roll("1d4", 100).unwrap();
        assert_eq!(roll.to_string(), "1D4=3");
    }

    #[test]
    fn roll_through_mutable_reference() {
        fn roll_twice(mut source: impl RandomSource) -> i64 {
            let a = source.roll("1d10", 10).unwrap().total;
            let b = source.roll("1d10", 10).unwrap().total;
            a + b
        }
        let mut dice = ScriptedDice::new([4, 7, 9]);
        assert_eq!(roll_twice(&mut dice), 11);
        assert_eq!(dice.remaining(), 1);
    }
}
