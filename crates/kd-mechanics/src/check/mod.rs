//! Checked rolls: a percentile roll whose outcome may rewrite an attribute.
//!
//! Every check runs the same five stages:
//!
//! 1. resolve the reference value (explicit, or read from the card)
//! 2. roll `1d100`
//! 3. classify the roll into a [`SuccessLevel`]
//! 4. work out the magnitude and the new value ([`CheckRule`])
//! 5. write the new value back if the rule asks for it and the reference
//!    came from the card
//!
//! [`SanityCheck`] and [`GrowthCheck`] are the two rules shipped here.

pub mod growth;
pub mod sanity;

pub use growth::{GrowthCheck, GrowthFormula};
pub use sanity::SanityCheck;

use std::borrow::Cow;
use std::fmt;

use kd_core::{CharacterStore, RandomSource};
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Faces of the primary percentile roll.
pub const PERCENTILE_FACES: u32 = 100;

/// How well a percentile roll did against its reference value.
///
/// Levels are ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SuccessLevel {
    /// A fumble.
    CriticalFail,
    /// Rolled over the reference value.
    Fail,
    /// Rolled at or under the reference value.
    Success,
    /// Rolled at or under half the reference value.
    HardSuccess,
    /// Rolled at or under a fifth of the reference value.
    ExtremeSuccess,
    /// Rolled a 1.
    CriticalSuccess,
}

impl SuccessLevel {
    /// Whether this is any of the success tiers.
    pub fn is_success(self) -> bool {
        self >= Self::Success
    }
}

impl fmt::Display for SuccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CriticalFail => "critical failure",
            Self::Fail => "failure",
            Self::Success => "success",
            Self::HardSuccess => "hard success",
            Self::ExtremeSuccess => "extreme success",
            Self::CriticalSuccess => "critical success",
        };
        write!(f, "{s}")
    }
}

/// Classify a percentile roll against a reference value.
///
/// A 1 is always a critical success and a 100 always a critical failure.
/// Below a reference of 50, anything over 95 is also a critical failure.
pub fn classify(roll: i64, reference: i64) -> SuccessLevel {
    if roll == 1 {
        SuccessLevel::CriticalSuccess
    } else if roll >= 100 {
        SuccessLevel::CriticalFail
    } else if roll <= reference / 5 {
        SuccessLevel::ExtremeSuccess
    } else if roll <= reference / 2 {
        SuccessLevel::HardSuccess
    } else if roll <= reference {
        SuccessLevel::Success
    } else if reference < 50 && roll > 95 {
        SuccessLevel::CriticalFail
    } else {
        SuccessLevel::Fail
    }
}

/// The size of the change a check produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Magnitude {
    /// The amount itself.
    pub value: i64,
    /// How it was obtained, if anything was rolled or looked up.
    pub detail: Option<String>,
}

impl Magnitude {
    /// A magnitude of zero with nothing to show.
    pub fn none() -> Self {
        Self::default()
    }
}

/// The variant-specific half of a checked roll.
pub trait CheckRule {
    /// The canonical attribute that supplies the reference value.
    fn attribute(&self) -> Cow<'_, str>;

    /// Reject reference values the rule cannot be rolled against.
    fn validate_reference(&self, _reference: i64) -> MechResult<()> {
        Ok(())
    }

    /// Classify the primary roll.
    fn classify(&self, roll: i64, reference: i64) -> SuccessLevel {
        classify(roll, reference)
    }

    /// Work out the magnitude for a classified roll.
    fn magnitude(
        &self,
        level: SuccessLevel,
        dice: &mut dyn RandomSource,
    ) -> MechResult<Magnitude>;

    /// The attribute's value after the check.
    fn new_value(&self, reference: i64, magnitude: i64) -> i64;

    /// Whether the new value should be written back to the card.
    fn should_commit(&self, level: SuccessLevel, magnitude: i64) -> bool;
}

/// Everything a checked roll produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// The governing attribute.
    pub attribute: String,
    /// The percentile roll.
    pub roll_value: i64,
    /// The value rolled against.
    pub reference_value: i64,
    /// The classification of the roll.
    pub success_level: SuccessLevel,
    /// The size of the change.
    pub magnitude: i64,
    /// The attribute's value after the check.
    pub new_value: i64,
    /// Rendering of the magnitude roll, if any.
    pub detail: Option<String>,
    /// Whether `new_value` was written to the card.
    pub committed: bool,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "D100={}/{} {}",
            self.roll_value, self.reference_value, self.success_level
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " {detail}")?;
        }
        write!(
            f,
            " {}: {}->{}",
            self.attribute, self.reference_value, self.new_value
        )
    }
}

/// Run a checked roll for `card`.
///
/// With `explicit_reference` the card is never read or written. Any error
/// aborts the check before the store is touched.
pub fn run_check<R, S>(
    rule: &R,
    card: &str,
    explicit_reference: Option<i64>,
    store: &mut S,
    dice: &mut dyn RandomSource,
    max_attributes: usize,
) -> MechResult<CheckOutcome>
where
    R: CheckRule + ?Sized,
    S: CharacterStore + ?Sized,
{
    let attribute = rule.attribute();

    let (reference, from_store) = match explicit_reference {
        Some(value) => (value, false),
        None => {
            let value = store.attribute(card, &attribute).ok_or_else(|| {
                MechError::MissingAttribute {
                    card: card.to_string(),
                    attribute: attribute.to_string(),
                }
            })?;
            (value, true)
        }
    };
    rule.validate_reference(reference)?;
    tracing::debug!(card, attribute = %attribute, reference, from_store, "check reference");

    let roll = dice.roll("1d100", PERCENTILE_FACES)?.total;
    let level = rule.classify(roll, reference);
    tracing::debug!(roll, reference, level = %level, "check classified");

    let magnitude = rule.magnitude(level, dice)?;
    let new_value = rule.new_value(reference, magnitude.value);

    let committed = if from_store && rule.should_commit(level, magnitude.value) {
        let stored = store.set_attribute(card, &attribute, new_value, max_attributes);
        if !stored {
            tracing::warn!(card, attribute = %attribute, "check result not stored");
        }
        stored
    } else {
        false
    };
    tracing::debug!(magnitude = magnitude.value, new_value, committed, "check resolved");

    Ok(CheckOutcome {
        attribute: attribute.into_owned(),
        roll_value: roll,
        reference_value: reference,
        success_level: level,
        magnitude: magnitude.value,
        new_value,
        detail: magnitude.detail,
        committed,
    })
}

/// Check that a magnitude expression only uses digits, `d`, `+` and `-`.
pub(crate) fn validate_loss_expression(expr: &str) -> MechResult<&str> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(MechError::Format("empty expression".to_string()));
    }
    if !expr
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, 'd' | 'D' | '+' | '-'))
    {
        return Err(MechError::Format(format!(
            "'{expr}' may only contain digits, d, + and -"
        )));
    }
    Ok(expr)
}
