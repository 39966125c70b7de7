//! Initiative roll arguments.
//!
//! `[modifier | value | expression] [name...]`:
//!
//! - `+3` / `-1` roll `1d20` with that modifier
//! - `18` uses the value as-is
//! - `2d10+1` rolls that expression; keep-dice notation such as `2DK` is
//!   taken as an expression too, and fails to evaluate
//! - anything else is taken as the name, rolling `1d20`

use kd_core::{DiceError, RandomSource, Roll};
use serde::{Deserialize, Serialize};

/// Expression rolled when none is given.
pub const DEFAULT_EXPRESSION: &str = "1d20";

/// Default die size for initiative expressions.
pub const INITIATIVE_FACES: u32 = 20;

/// How the initiative value is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiativeValue {
    /// Use this value directly.
    Fixed(i64),
    /// Roll this dice expression.
    Expression(String),
}

/// A parsed initiative roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeRoll {
    /// Who the entry is for.
    pub name: String,
    /// Where the value comes from.
    pub value: InitiativeValue,
}

impl InitiativeRoll {
    /// Parse command arguments. `default_name` is used when no name is given.
    pub fn parse<S: AsRef<str>>(args: &[S], default_name: &str) -> Self {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let name_from = |rest: &[&str]| {
            if rest.is_empty() {
                default_name.to_string()
            } else {
                rest.join(" ")
            }
        };

        let Some((first, rest)) = args.split_first() else {
            return Self::expression(DEFAULT_EXPRESSION, default_name.to_string());
        };

        if let Some(modifier) = signed_modifier(first) {
            Self::expression(&format!("{DEFAULT_EXPRESSION}{modifier}"), name_from(rest))
        } else if let Ok(value) = first.parse::<i64>() {
            Self {
                name: name_from(rest),
                value: InitiativeValue::Fixed(value),
            }
        } else if is_dice_expression(first) {
            Self::expression(first, name_from(rest))
        } else {
            Self::expression(DEFAULT_EXPRESSION, name_from(&args))
        }
    }

    fn expression(expr: &str, name: String) -> Self {
        Self {
            name,
            value: InitiativeValue::Expression(expr.to_string()),
        }
    }

    /// Produce the initiative value.
    pub fn evaluate(&self, dice: &mut dyn RandomSource) -> Result<Roll, DiceError> {
        match &self.value {
            InitiativeValue::Fixed(value) => Ok(Roll {
                total: *value,
                detail: value.to_string(),
            }),
            InitiativeValue::Expression(expr) => dice.roll(expr, INITIATIVE_FACES),
        }
    }
}

/// `+N` or `-N`, returned with its sign.
fn signed_modifier(arg: &str) -> Option<&str> {
    let digits = arg.strip_prefix(['+', '-'])?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(arg)
}

fn is_dice_expression(arg: &str) -> bool {
    !arg.is_empty()
        && arg.chars().all(|c| {
            c.is_ascii_digit()
                || matches!(c, 'd' | 'D' | 'k' | 'K' | '+' | '-' | '*' | '/' | '(' | ')')
        })
}
