//! Exploding d10 dice pools.
//!
//! Roll `n` ten-sided dice. Every die showing 8 or more is a success; every
//! die at or above the explode threshold adds one more die to the end of the
//! pool. A pool never rolls more than [`MAX_POOL_DRAWS`] dice in total.
//!
//! Pools are written either as `<count>a<threshold>` (`10a8`) or as an
//! arithmetic expression over attribute names (`敏捷+剑`), in which case the
//! threshold defaults to 8.

use std::collections::BTreeMap;
use std::fmt;

use kd_core::{AttributeCatalog, RandomSource};
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Faces on every pool die.
pub const POOL_DIE_FACES: u32 = 10;

/// A die at or above this value counts as a success.
pub const SUCCESS_THRESHOLD: u32 = 8;

/// Hard ceiling on dice rolled by one pool, explosions included.
pub const MAX_POOL_DRAWS: u32 = 100;

/// Explode threshold used when the pool is given as an expression.
pub const DEFAULT_EXPLODE_THRESHOLD: u32 = 8;

/// A validated pool request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    /// Dice rolled before explosions, `1..=100`.
    pub dice_count: u32,
    /// Dice at or above this value explode, `2..=10`.
    pub explode_threshold: u32,
}

impl PoolSpec {
    /// Validate a dice count and explode threshold.
    pub fn new(dice_count: i64, explode_threshold: i64) -> MechResult<Self> {
        if !(1..=i64::from(MAX_POOL_DRAWS)).contains(&dice_count) {
            return Err(MechError::Range(format!(
                "dice count must be between 1 and {MAX_POOL_DRAWS}, got {dice_count}"
            )));
        }
        if !(2..=i64::from(POOL_DIE_FACES)).contains(&explode_threshold) {
            return Err(MechError::Range(format!(
                "explode threshold must be between 2 and {POOL_DIE_FACES}, got {explode_threshold}"
            )));
        }
        Ok(Self {
            dice_count: dice_count as u32,
            explode_threshold: explode_threshold as u32,
        })
    }
}

impl fmt::Display for PoolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}a{}", self.dice_count, self.explode_threshold)
    }
}

/// How a single draw should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMark {
    /// At or above the explode threshold.
    Explode,
    /// A success that did not explode.
    Success,
    /// A natural 1.
    Botch,
    /// Nothing special.
    Plain,
}

impl DrawMark {
    /// Classify one draw against the pool's explode threshold.
    pub fn of(value: u32, explode_threshold: u32) -> Self {
        if value >= explode_threshold {
            Self::Explode
        } else if value >= SUCCESS_THRESHOLD {
            Self::Success
        } else if value == 1 {
            Self::Botch
        } else {
            Self::Plain
        }
    }
}

/// The rolled pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOutcome {
    /// The request that was rolled.
    pub spec: PoolSpec,
    /// Every die in draw order; exploded dice follow the originals.
    pub draws: Vec<u32>,
    /// Dice showing [`SUCCESS_THRESHOLD`] or more.
    pub success_count: u32,
}

impl PoolOutcome {
    /// Highlight marks, parallel to `draws`.
    pub fn marks(&self) -> impl Iterator<Item = DrawMark> + '_ {
        self.draws
            .iter()
            .map(|&v| DrawMark::of(v, self.spec.explode_threshold))
    }

    /// Dice added by explosions.
    pub fn extra_dice(&self) -> usize {
        self.draws.len() - self.spec.dice_count as usize
    }

    /// Render the draws with highlight markers: `[9!]` explode, `[8]` success,
    /// `(1)` botch.
    pub fn render_draws(&self) -> String {
        self.draws
            .iter()
            .zip(self.marks())
            .map(|(v, mark)| match mark {
                DrawMark::Explode => format!("[{v}!]"),
                DrawMark::Success => format!("[{v}]"),
                DrawMark::Botch => format!("({v})"),
                DrawMark::Plain => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The result without the individual draws: `10a8: successes: 4`.
    pub fn summary(&self) -> String {
        format!("{}: successes: {}", self.spec, self.success_count)
    }
}

impl fmt::Display for PoolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} successes: {}",
            self.spec,
            self.render_draws(),
            self.success_count
        )
    }
}

/// Parse and roll a pool expression.
///
/// `attributes` supplies values for attribute names in expression form; any
/// canonical name in it also matches its aliases.
pub fn resolve_pool(
    expression: &str,
    attributes: &BTreeMap<String, i64>,
    catalog: &AttributeCatalog,
    dice: &mut dyn RandomSource,
) -> MechResult<PoolOutcome> {
    let spec = parse_pool_spec(expression, attributes, catalog, dice)?;
    roll_pool(spec, dice)
}

/// Turn pool text into a validated [`PoolSpec`].
pub fn parse_pool_spec(
    expression: &str,
    attributes: &BTreeMap<String, i64>,
    catalog: &AttributeCatalog,
    dice: &mut dyn RandomSource,
) -> MechResult<PoolSpec> {
    let text = expression.trim();
    if text.is_empty() {
        return Err(MechError::Format("empty pool expression".to_string()));
    }

    if let Some((count, threshold)) = split_fixed_form(text) {
        let count = count.parse::<i64>().unwrap_or(i64::MAX);
        let threshold = threshold.parse::<i64>().unwrap_or(i64::MAX);
        return PoolSpec::new(count, threshold);
    }

    let substituted = substitute_attributes(text, attributes, catalog);
    let leftover: String = substituted
        .chars()
        .filter(|c| c.is_alphabetic() && !matches!(c, 'd' | 'D'))
        .collect();
    if !leftover.is_empty() {
        return Err(MechError::UnknownAttribute(leftover));
    }

    let roll = dice
        .roll(&substituted, POOL_DIE_FACES)
        .map_err(|e| MechError::Format(format!("cannot evaluate '{substituted}': {e}")))?;
    tracing::debug!(expression = text, substituted = %substituted, count = roll.total, "pool size");
    PoolSpec::new(roll.total, i64::from(DEFAULT_EXPLODE_THRESHOLD))
}

/// Match `<digits>a<digits>` (either case of `a`) exactly.
fn split_fixed_form(text: &str) -> Option<(&str, &str)> {
    let (count, threshold) = text.split_once(['a', 'A'])?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (all_digits(count) && all_digits(threshold)).then_some((count, threshold))
}

/// Replace attribute names with their values, longest spelling first.
///
/// Matching is a literal, ASCII-case-insensitive scan, so names containing
/// operator characters never change the meaning of the surrounding text.
fn substitute_attributes(
    text: &str,
    attributes: &BTreeMap<String, i64>,
    catalog: &AttributeCatalog,
) -> String {
    let mut candidates: Vec<(String, i64)> = Vec::new();
    for (name, &value) in attributes {
        candidates.push((name.to_ascii_lowercase(), value));
        for spelling in catalog.spellings_of(name) {
            candidates.push((spelling.to_ascii_lowercase(), value));
        }
    }
    candidates.retain(|(pattern, _)| !pattern.is_empty());
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while pos < text.len() {
        let haystack = &lower[pos..];
        if let Some((pattern, value)) = candidates.iter().find(|(p, _)| haystack.starts_with(p)) {
            out.push_str(&value.to_string());
            pos += pattern.len();
            continue;
        }
        let Some(c) = text[pos..].chars().next() else {
            break;
        };
        out.push(c);
        pos += c.len_utf8();
    }
    out
}

/// Roll a validated pool.
pub fn roll_pool(spec: PoolSpec, dice: &mut dyn RandomSource) -> MechResult<PoolOutcome> {
    let mut draws = Vec::with_capacity(spec.dice_count as usize);
    let mut success_count = 0;
    let mut total = spec.dice_count;

    let mut i = 0;
    while i < total {
        let value = dice.draw(POOL_DIE_FACES)?;
        draws.push(value);
        if value >= SUCCESS_THRESHOLD {
            success_count += 1;
        }
        if value >= spec.explode_threshold && total < MAX_POOL_DRAWS {
            total += 1;
        }
        i += 1;
    }

    tracing::debug!(spec = %spec, draws = draws.len(), success_count, "rolled pool");
    Ok(PoolOutcome {
        spec,
        draws,
        success_count,
    })
}
