//! Skill growth checks.
//!
//! A growth check succeeds when the percentile roll lands above the current
//! skill value, and the skill then rises by `1d10`. With a [`GrowthFormula`]
//! there is no percentile gate: the success half is always rolled and added.

use std::borrow::Cow;

use kd_core::{AttributeCatalog, RandomSource};
use serde::{Deserialize, Serialize};

use super::{CheckRule, Magnitude, SuccessLevel, validate_loss_expression};
use crate::error::{MechError, MechResult};

/// Die size of the standard improvement roll.
const STANDARD_FACES: u32 = 10;

/// Default die size for formula expressions.
const FORMULA_FACES: u32 = 100;

/// The `+<success>/<failure>` improvement form, e.g. `+1D3/1D10`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthFormula {
    /// Rolled as the improvement when the check succeeds.
    pub success: String,
    /// Accepted and kept, but no rule currently rolls it.
    pub failure: String,
}

impl GrowthFormula {
    /// Parse `+<success>/<failure>`. The leading `+` is required.
    pub fn parse(text: &str) -> MechResult<Self> {
        let text = text.trim();
        let body = text.strip_prefix('+').ok_or_else(|| {
            MechError::Format(format!("growth formula must start with '+', got '{text}'"))
        })?;
        let (success, failure) = body.split_once('/').ok_or_else(|| {
            MechError::Format(format!("expected +<success>/<failure>, got '{text}'"))
        })?;
        Ok(Self {
            success: validate_loss_expression(success)?.to_string(),
            failure: validate_loss_expression(failure)?.to_string(),
        })
    }

    /// Whether `text` looks like a formula rather than a skill value.
    pub fn looks_like(text: &str) -> bool {
        let text = text.trim();
        text.starts_with('+') && text.contains('/')
    }
}

/// A growth check on one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthCheck {
    skill: String,
    formula: Option<GrowthFormula>,
}

impl GrowthCheck {
    /// Check `skill`, resolved through the alias catalog.
    pub fn new(skill: &str, catalog: &AttributeCatalog) -> Self {
        Self {
            skill: catalog.canonical(skill).into_owned(),
            formula: None,
        }
    }

    /// Use an alternate improvement formula.
    pub fn with_formula(mut self, formula: GrowthFormula) -> Self {
        self.formula = Some(formula);
        self
    }

    /// The canonical skill name.
    pub fn skill(&self) -> &str {
        &self.skill
    }

    /// The alternate formula, if any.
    pub fn formula(&self) -> Option<&GrowthFormula> {
        self.formula.as_ref()
    }
}

impl CheckRule for GrowthCheck {
    fn attribute(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.skill)
    }

    fn classify(&self, roll: i64, reference: i64) -> SuccessLevel {
        if self.formula.is_some() || roll > reference {
            SuccessLevel::Success
        } else {
            SuccessLevel::Fail
        }
    }

    fn magnitude(
        &self,
        level: SuccessLevel,
        dice: &mut dyn RandomSource,
    ) -> MechResult<Magnitude> {
        if !level.is_success() {
            return Ok(Magnitude::none());
        }
        let roll = match &self.formula {
            Some(formula) => dice.roll(&formula.success, FORMULA_FACES)?,
            None => dice.roll("1d10", STANDARD_FACES)?,
        };
        Ok(Magnitude {
            value: roll.total,
            detail: Some(roll.detail),
        })
    }

    fn new_value(&self, reference: i64, magnitude: i64) -> i64 {
        reference.saturating_add(magnitude)
    }

    fn should_commit(&self, level: SuccessLevel, _magnitude: i64) -> bool {
        level.is_success()
    }
}
