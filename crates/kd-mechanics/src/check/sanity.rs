//! Sanity checks.

use std::borrow::Cow;

use kd_core::RandomSource;
use serde::{Deserialize, Serialize};

use super::{CheckRule, Magnitude, SuccessLevel, validate_loss_expression};
use crate::error::{MechError, MechResult};

/// The attribute every sanity check rolls against.
pub const SANITY_ATTRIBUTE: &str = "理智";

/// Default die size for loss expressions such as `1d` or a bare `d`.
const LOSS_FACES: u32 = 100;

/// A sanity check with its success and failure losses, e.g. `1/1d6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityCheck {
    /// Loss on any success tier.
    pub success_loss: String,
    /// Loss on failure, and its maximum on a critical failure.
    pub failure_loss: String,
}

impl SanityCheck {
    /// Build a check from two loss expressions.
    pub fn new(success_loss: &str, failure_loss: &str) -> MechResult<Self> {
        Ok(Self {
            success_loss: validate_loss_expression(success_loss)?.to_string(),
            failure_loss: validate_loss_expression(failure_loss)?.to_string(),
        })
    }

    /// Parse `<success>/<failure>`.
    pub fn parse(text: &str) -> MechResult<Self> {
        let mut halves = text.trim().split('/');
        match (halves.next(), halves.next(), halves.next()) {
            (Some(success), Some(failure), None) => Self::new(success, failure),
            _ => Err(MechError::Format(format!(
                "expected <success>/<failure>, got '{}'",
                text.trim()
            ))),
        }
    }
}

impl CheckRule for SanityCheck {
    fn attribute(&self) -> Cow<'_, str> {
        Cow::Borrowed(SANITY_ATTRIBUTE)
    }

    fn validate_reference(&self, reference: i64) -> MechResult<()> {
        if reference <= 0 {
            return Err(MechError::InvalidReference(reference));
        }
        Ok(())
    }

    fn magnitude(
        &self,
        level: SuccessLevel,
        dice: &mut dyn RandomSource,
    ) -> MechResult<Magnitude> {
        let expr = if level.is_success() {
            &self.success_loss
        } else {
            &self.failure_loss
        };

        if level == SuccessLevel::CriticalFail {
            let max = dice.max_value(expr, LOSS_FACES).ok_or_else(|| {
                MechError::Format(format!("cannot evaluate '{expr}'"))
            })?;
            return Ok(Magnitude {
                value: max,
                detail: Some(format!("max({expr})={max}")),
            });
        }

        let roll = dice.roll(expr, LOSS_FACES)?;
        Ok(Magnitude {
            value: roll.total,
            detail: Some(roll.detail),
        })
    }

    fn new_value(&self, reference: i64, magnitude: i64) -> i64 {
        reference.saturating_sub(magnitude).max(0)
    }

    fn should_commit(&self, _level: SuccessLevel, magnitude: i64) -> bool {
        magnitude != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::run_check;
    use kd_core::{CharacterStore, DiceError, DiceRoller, MemoryStore, ScriptedDice};

    fn store_with_sanity(value: i64) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set_attribute("pc", SANITY_ATTRIBUTE, value, 100);
        store
    }

    fn check(text: &str) -> SanityCheck {
        SanityCheck::parse(text).unwrap()
    }

    #[test]
    fn parse_halves() {
        let sc = check("1/1d6");
        assert_eq!(sc.success_loss, "1");
        assert_eq!(sc.failure_loss, "1d6");
        assert_eq!(check(" 0 / 1D10+1 ").failure_loss, "1D10+1");
    }

    #[test]
    fn parse_rejects_bad_forms() {
        for text in ["1d6", "1/2/3", "/1d6", "1/", "1/x", "1*2/1d6"] {
            assert!(
                matches!(SanityCheck::parse(text), Err(MechError::Format(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn failure_rolls_failure_loss() {
        let mut store = store_with_sanity(50);
        let mut dice = ScriptedDice::new([80, 4]);
        let out = run_check(&check("1/1d6"), "pc", None, &mut store, &mut dice, 100).unwrap();
        assert_eq!(out.roll_value, 80);
        assert_eq!(out.success_level, SuccessLevel::Fail);
        assert_eq!(out.magnitude, 4);
        assert_eq!(out.new_value, 46);
        assert_eq!(out.detail.as_deref(), Some("1D6=4"));
        assert!(out.committed);
        assert_eq!(store.attribute("pc", SANITY_ATTRIBUTE), Some(46));
    }

    #[test]
    fn success_rolls_success_loss() {
        let mut store = store_with_sanity(50);
        let mut dice = ScriptedDice::new([20, 2]);
        let out = run_check(&check("1d3/1d6"), "pc", None, &mut store, &mut dice, 100).unwrap();
        assert!(out.success_level.is_success());
        assert_eq!(out.magnitude, 2);
        assert_eq!(out.new_value, 48);
        assert_eq!(store.attribute("pc", SANITY_ATTRIBUTE), Some(48));
    }

    #[test]
    fn critical_failure_takes_maximum_loss() {
        let mut store = store_with_sanity(50);
        let mut dice = ScriptedDice::new([100]);
        let out = run_check(&check("1/1d6+1"), "pc", None, &mut store, &mut dice, 100).unwrap();
        assert_eq!(out.success_level, SuccessLevel::CriticalFail);
        assert_eq!(out.magnitude, 7);
        assert_eq!(out.new_value, 43);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn zero_loss_is_not_written() {
        let mut store = store_with_sanity(50);
        let mut dice = ScriptedDice::new([20]);
        let out = run_check(&check("0/1d6"), "pc", None, &mut store, &mut dice, 100).unwrap();
        assert_eq!(out.magnitude, 0);
        assert_eq!(out.new_value, 50);
        assert!(!out.committed);
    }

    #[test]
    fn loss_never_goes_negative() {
        let mut store = store_with_sanity(3);
        let mut dice = ScriptedDice::new([90, 10]);
        let out = run_check(&check("1/1d10"), "pc", None, &mut store, &mut dice, 100).unwrap();
        assert_eq!(out.new_value, 0);
        assert_eq!(store.attribute("pc", SANITY_ATTRIBUTE), Some(0));
    }

    #[test]
    fn explicit_reference_does_not_touch_store() {
        let mut store = store_with_sanity(50);
        let mut dice = ScriptedDice::new([80, 4]);
        let out = run_check(&check("1/1d6"), "pc", Some(70), &mut store, &mut dice, 100).unwrap();
        assert_eq!(out.reference_value, 70);
        assert_eq!(out.success_level, SuccessLevel::Fail);
        assert_eq!(out.new_value, 66);
        assert!(!out.committed);
        assert_eq!(store.attribute("pc", SANITY_ATTRIBUTE), Some(50));
    }

    #[test]
    fn missing_sanity() {
        let mut store = MemoryStore::new();
        let mut dice = ScriptedDice::new([50]);
        let err = run_check(&check("1/1d6"), "pc", None, &mut store, &mut dice, 100).unwrap_err();
        assert_eq!(
            err,
            MechError::MissingAttribute {
                card: "pc".to_string(),
                attribute: SANITY_ATTRIBUTE.to_string(),
            }
        );
        assert_eq!(dice.remaining(), 1);
    }

    #[test]
    fn non_positive_reference_is_rejected_before_rolling() {
        let mut store = store_with_sanity(0);
        let mut dice = ScriptedDice::new([50]);
        let err = run_check(&check("1/1d6"), "pc", None, &mut store, &mut dice, 100).unwrap_err();
        assert_eq!(err, MechError::InvalidReference(0));
        assert_eq!(dice.remaining(), 1);
    }

    #[test]
    fn exhausted_source_leaves_store_alone() {
        let mut store = store_with_sanity(50);
        let mut dice = ScriptedDice::new([80]);
        let err = run_check(&check("1/1d6"), "pc", None, &mut store, &mut dice, 100).unwrap_err();
        assert_eq!(err, MechError::RandomSource(DiceError::Exhausted));
        assert_eq!(store.attribute("pc", SANITY_ATTRIBUTE), Some(50));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn new_value_never_negative(reference in 1i64..=120, seed in any::<u64>()) {
                let mut store = store_with_sanity(reference);
                let mut dice = DiceRoller::seeded(seed);
                let out = run_check(&check("1d10/2d10"), "pc", None, &mut store, &mut dice, 100).unwrap();
                prop_assert!(out.new_value >= 0);
                prop_assert_eq!(out.new_value, (reference - out.magnitude).max(0));
            }
        }
    }
}
