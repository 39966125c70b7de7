//! Attribute directives: freeform text to attribute mutations.
//!
//! Players type things like `力量60 敏捷 50`, `Kokona--san-1d6` or paste a
//! generator summary such as `力量STR=3D6*5=60/30/12`. Parsing is best-effort:
//! anything not understood is dropped instead of failing the whole line.

use std::fmt;

use kd_core::{AttributeCatalog, CharacterStore, RandomSource};
use serde::{Deserialize, Serialize};

use crate::error::MechResult;

/// Default die size for deferred expressions such as `1d` in `san-1d`.
const DEFERRED_FACES: u32 = 100;

/// How an operation changes an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    /// Overwrite the value.
    Set,
    /// Add to the current value.
    Add,
    /// Subtract from the current value.
    Subtract,
}

impl OpKind {
    fn symbol(self) -> char {
        match self {
            Self::Set => '=',
            Self::Add => '+',
            Self::Subtract => '-',
        }
    }
}

/// The operand of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpValue {
    /// A plain integer.
    Literal(i64),
    /// Dice notation, rolled when the directive is applied.
    Deferred(String),
}

impl fmt::Display for OpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(n) => write!(f, "{n}"),
            Self::Deferred(expr) => write!(f, "{expr}"),
        }
    }
}

/// A single attribute mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Canonical attribute name.
    pub attribute: String,
    /// What to do.
    pub kind: OpKind,
    /// The operand.
    pub value: OpValue,
}

/// The result of parsing a directive line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Card named with a `<card>--` prefix, if any.
    pub target_card: Option<String>,
    /// Operations in the order they appeared.
    pub operations: Vec<Operation>,
}

/// Parse a directive line. Never fails; unparseable tokens are skipped.
pub fn parse_directive(input: &str, catalog: &AttributeCatalog) -> Directive {
    let (target_card, body) = split_card_prefix(input.trim());
    let mut operations = Vec::new();

    for segment in body.split('|').map(str::trim).filter(|s| !s.is_empty()) {
        let tokens: Vec<&str> = segment.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            i += 1;

            if let Some((name, value)) = derived_output(token) {
                operations.push(set(catalog, name, OpValue::Literal(value)));
                continue;
            }
            if token.contains(['=', '/', '*']) {
                continue;
            }
            if token.chars().all(is_name_char) {
                if let Some(value) = tokens.get(i).and_then(|next| leading_int(next)) {
                    operations.push(set(catalog, token, OpValue::Literal(value)));
                    i += 1;
                }
                continue;
            }
            if let Some(fused) = fused_operations(token, catalog) {
                operations.extend(fused);
            }
        }
    }

    tracing::debug!(
        input,
        card = target_card.as_deref(),
        operations = operations.len(),
        "parsed directive"
    );
    Directive {
        target_card,
        operations,
    }
}

/// Split an optional `<card>--` prefix off the directive text.
fn split_card_prefix(text: &str) -> (Option<String>, &str) {
    for (idx, _) in text.match_indices("--") {
        if idx == 0 {
            continue;
        }
        let rest = &text[idx + 2..];
        if rest.is_empty() {
            break;
        }
        let card = text[..idx].trim();
        if card.is_empty() {
            break;
        }
        return (Some(card.to_string()), rest.trim());
    }
    (None, text)
}

fn is_han(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || is_han(c)
}

fn set(catalog: &AttributeCatalog, name: &str, value: OpValue) -> Operation {
    Operation {
        attribute: catalog.canonical(name).into_owned(),
        kind: OpKind::Set,
        value,
    }
}

/// Match generator output like `力量STR=3D6*5=60/30/12`, yielding `(力量, 60)`.
fn derived_output(token: &str) -> Option<(&str, i64)> {
    let name_end = token
        .char_indices()
        .find(|(_, c)| !is_han(*c))
        .map_or(token.len(), |(i, _)| i);
    if name_end == 0 {
        return None;
    }
    let rest = token[name_end..].trim_start_matches(|c: char| c.is_ascii_uppercase());
    let formula = rest.strip_prefix('=')?;

    for (idx, _) in formula.match_indices('=') {
        let after = &formula[idx + 1..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            let value = after[..digits].parse().ok()?;
            return Some((&token[..name_end], value));
        }
    }
    None
}

/// Parse a token made only of fused `name[op]value` units, e.g. `力量30敏捷40`,
/// `hp-1d6` or `理智：55`. Returns `None` unless the whole token is consumed.
fn fused_operations(token: &str, catalog: &AttributeCatalog) -> Option<Vec<Operation>> {
    let mut ops = Vec::new();
    let mut rest = token;

    while !rest.is_empty() {
        let name_len = rest
            .char_indices()
            .find(|(_, c)| !is_name_char(*c))
            .map_or(rest.len(), |(i, _)| i);
        if name_len == 0 {
            return None;
        }
        let name = &rest[..name_len];
        rest = &rest[name_len..];

        let mut chars = rest.chars();
        let (kind, explicit) = match chars.next()? {
            '+' => (OpKind::Add, true),
            '-' => (OpKind::Subtract, true),
            ':' | '：' => (OpKind::Set, true),
            c if c.is_ascii_digit() => (OpKind::Set, false),
            _ => return None,
        };
        if explicit {
            rest = chars.as_str();
        }

        let (value, remaining) = if explicit {
            scan_operand(rest)?
        } else {
            scan_digits(rest)?
        };
        rest = remaining;

        ops.push(Operation {
            attribute: catalog.canonical(name).into_owned(),
            kind,
            value,
        });
    }

    (!ops.is_empty()).then_some(ops)
}

fn digit_prefix_len(s: &str) -> usize {
    s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len()
}

/// The integer at the start of `s`, with an optional sign: `60,` gives 60.
fn leading_int(s: &str) -> Option<i64> {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let sign_len = s.len() - unsigned.len();
    let digits = digit_prefix_len(unsigned);
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

fn scan_digits(s: &str) -> Option<(OpValue, &str)> {
    let len = digit_prefix_len(s);
    if len == 0 {
        return None;
    }
    let value = s[..len].parse().ok()?;
    Some((OpValue::Literal(value), &s[len..]))
}

/// An operand after an explicit operator: the longest run of dice notation
/// the evaluator accepts (`10`, `1d6+1`, `d100`, `1d`). A `d` followed by a
/// letter starts the next attribute name instead, so `+5dex10` stops at `5`.
fn scan_operand(s: &str) -> Option<(OpValue, &str)> {
    let bytes = s.as_bytes();
    let mut run = 0;
    while let Some(&b) = bytes.get(run) {
        let accepted = match b {
            b'0'..=b'9' | b'+' | b'-' | b'*' | b'/' | b'(' | b')' => true,
            b'd' | b'D' => !s[run + 1..].starts_with(is_name_char),
            _ => false,
        };
        if !accepted {
            break;
        }
        run += 1;
    }

    let end = (1..=run)
        .rev()
        .find(|&end| kd_core::dice::parse(&s[..end]).is_ok())?;
    let operand = &s[..end];
    let value = if digit_prefix_len(operand) == end {
        OpValue::Literal(operand.parse().ok()?)
    } else {
        OpValue::Deferred(operand.to_string())
    };
    Some((value, &s[end..]))
}

/// One applied operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedChange {
    /// Canonical attribute name.
    pub attribute: String,
    /// The operation kind.
    pub kind: OpKind,
    /// The resolved operand.
    pub amount: i64,
    /// Roll breakdown when the operand was dice notation.
    pub detail: Option<String>,
    /// The value before the change, if the attribute existed.
    pub previous: Option<i64>,
    /// The value written (or that would have been written).
    pub value: i64,
    /// Whether the store accepted the write.
    pub stored: bool,
}

impl fmt::Display for AppliedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Set => write!(f, "{}={}", self.attribute, self.value),
            kind => {
                let amount = self
                    .detail
                    .clone()
                    .unwrap_or_else(|| self.amount.to_string());
                write!(f, "{}{}{}={}", self.attribute, kind.symbol(), amount, self.value)
            }
        }
    }
}

/// The outcome of applying a directive to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDirective {
    /// The card that was written.
    pub card: String,
    /// Every operation, in order, including rejected writes.
    pub changes: Vec<AppliedChange>,
}

impl AppliedDirective {
    /// Changes the store accepted.
    pub fn stored(&self) -> impl Iterator<Item = &AppliedChange> {
        self.changes.iter().filter(|c| c.stored)
    }
}

/// Apply a parsed directive to a character store.
///
/// Deferred operands are rolled first, so a failing roll leaves the store
/// untouched. `Add` and `Subtract` treat a missing attribute as 0 and never
/// write a negative result. Writes refused by the attribute cap are reported
/// with `stored: false`.
pub fn apply_directive<S: CharacterStore + ?Sized>(
    directive: &Directive,
    default_card: &str,
    store: &mut S,
    dice: &mut dyn RandomSource,
    max_attributes: usize,
) -> MechResult<AppliedDirective> {
    let card = directive
        .target_card
        .clone()
        .unwrap_or_else(|| default_card.to_string());

    let mut resolved = Vec::with_capacity(directive.operations.len());
    for op in &directive.operations {
        let amount = match &op.value {
            OpValue::Literal(n) => (*n, None),
            OpValue::Deferred(expr) => {
                let roll = dice.roll(expr, DEFERRED_FACES)?;
                (roll.total, Some(roll.detail))
            }
        };
        resolved.push((op, amount));
    }

    let mut changes = Vec::with_capacity(resolved.len());
    for (op, (amount, detail)) in resolved {
        let previous = store.attribute(&card, &op.attribute);
        let current = previous.unwrap_or(0);
        let value = match op.kind {
            OpKind::Set => amount,
            OpKind::Add => current.saturating_add(amount).max(0),
            OpKind::Subtract => current.saturating_sub(amount).max(0),
        };
        let stored = store.set_attribute(&card, &op.attribute, value, max_attributes);
        if !stored {
            tracing::warn!(card = %card, attribute = %op.attribute, "write rejected");
        }
        changes.push(AppliedChange {
            attribute: op.attribute.clone(),
            kind: op.kind,
            amount,
            detail,
            previous,
            value,
            stored,
        });
    }

    Ok(AppliedDirective { card, changes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kd_core::{MemoryStore, ScriptedDice, standard_catalog};

    fn parse(input: &str) -> Directive {
        parse_directive(input, standard_catalog())
    }

    fn op(attribute: &str, kind: OpKind, value: OpValue) -> Operation {
        Operation {
            attribute: attribute.to_string(),
            kind,
            value,
        }
    }

    #[test]
    fn fused_sets_without_spaces() {
        let d = parse("力量30敏捷40");
        assert_eq!(d.target_card, None);
        assert_eq!(
            d.operations,
            vec![
                op("力量", OpKind::Set, OpValue::Literal(30)),
                op("敏捷", OpKind::Set, OpValue::Literal(40)),
            ]
        );
    }

    #[test]
    fn name_then_value_tokens() {
        let d = parse("力量 60 dex 50");
        assert_eq!(
            d.operations,
            vec![
                op("力量", OpKind::Set, OpValue::Literal(60)),
                op("敏捷", OpKind::Set, OpValue::Literal(50)),
            ]
        );
    }

    #[test]
    fn card_prefix() {
        let d = parse("Kokona--力量30");
        assert_eq!(d.target_card.as_deref(), Some("Kokona"));
        assert_eq!(d.operations.len(), 1);
    }

    #[test]
    fn card_prefix_needs_both_sides() {
        assert_eq!(parse("--力量30").target_card, None);
        assert_eq!(parse("Kokona--").target_card, None);
    }

    #[test]
    fn add_subtract_and_dice() {
        let d = parse("力量+2d6 san-10 hp-d3");
        assert_eq!(
            d.operations,
            vec![
                op("力量", OpKind::Add, OpValue::Deferred("2d6".into())),
                op("理智", OpKind::Subtract, OpValue::Literal(10)),
                op("生命", OpKind::Subtract, OpValue::Deferred("d3".into())),
            ]
        );
    }

    #[test]
    fn compound_dice_operands() {
        let d = parse("hp-1d6+1 力量+2d6+3 san-1d");
        assert_eq!(
            d.operations,
            vec![
                op("生命", OpKind::Subtract, OpValue::Deferred("1d6+1".into())),
                op("力量", OpKind::Add, OpValue::Deferred("2d6+3".into())),
                op("理智", OpKind::Subtract, OpValue::Deferred("1d".into())),
            ]
        );
    }

    #[test]
    fn operand_stops_at_next_name() {
        let d = parse("力量+1d6+1敏捷-2 幸运+5dex10");
        assert_eq!(
            d.operations,
            vec![
                op("力量", OpKind::Add, OpValue::Deferred("1d6+1".into())),
                op("敏捷", OpKind::Subtract, OpValue::Literal(2)),
                op("幸运", OpKind::Add, OpValue::Literal(5)),
                op("敏捷", OpKind::Set, OpValue::Literal(10)),
            ]
        );
    }

    #[test]
    fn unbalanced_operand_is_dropped() {
        assert!(parse("hp-(1d6").operations.is_empty());
        assert!(parse("hp-+").operations.is_empty());
    }

    #[test]
    fn value_may_carry_trailing_punctuation() {
        let d = parse("力量 60, 敏捷 50; 幸运 -5");
        assert_eq!(
            d.operations,
            vec![
                op("力量", OpKind::Set, OpValue::Literal(60)),
                op("敏捷", OpKind::Set, OpValue::Literal(50)),
                op("幸运", OpKind::Set, OpValue::Literal(-5)),
            ]
        );
    }

    #[test]
    fn colon_forms() {
        let d = parse("理智:55 幸运：40");
        assert_eq!(
            d.operations,
            vec![
                op("理智", OpKind::Set, OpValue::Literal(55)),
                op("幸运", OpKind::Set, OpValue::Literal(40)),
            ]
        );
    }

    #[test]
    fn derived_output_lines() {
        let d = parse("力量STR=3D6*5=60/30/12 敏捷DEX=3D6*5=45/22/9");
        assert_eq!(
            d.operations,
            vec![
                op("力量", OpKind::Set, OpValue::Literal(60)),
                op("敏捷", OpKind::Set, OpValue::Literal(45)),
            ]
        );
    }

    #[test]
    fn complex_expressions_are_skipped() {
        let d = parse("力量=60 体质*2 60/30 敏捷50");
        assert_eq!(d.operations, vec![op("敏捷", OpKind::Set, OpValue::Literal(50))]);
    }

    #[test]
    fn stray_tokens_are_dropped() {
        let d = parse("!! 30 力量30! 侦查 abc 意志70");
        assert_eq!(d.operations, vec![op("意志", OpKind::Set, OpValue::Literal(70))]);
    }

    #[test]
    fn bare_name_without_value_is_skipped() {
        assert!(parse("力量").operations.is_empty());
        assert!(parse("力量 敏捷").operations.is_empty());
    }

    #[test]
    fn segments_are_processed_in_order() {
        let d = parse("力量 60 | 敏捷 50|  | 体质40");
        let names: Vec<&str> = d.operations.iter().map(|o| o.attribute.as_str()).collect();
        assert_eq!(names, vec!["力量", "敏捷", "体质"]);
    }

    #[test]
    fn value_lookahead_does_not_cross_segments() {
        assert!(parse("力量 | 60").operations.is_empty());
    }

    #[test]
    fn unknown_skills_keep_their_name() {
        let d = parse("侦查60 Spot 25");
        assert_eq!(
            d.operations,
            vec![
                op("侦查", OpKind::Set, OpValue::Literal(60)),
                op("Spot", OpKind::Set, OpValue::Literal(25)),
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), Directive::default());
        assert_eq!(parse("   |  "), Directive::default());
    }

    #[test]
    fn apply_set_add_subtract() {
        let mut store = MemoryStore::new();
        store.set_attribute("pc", "理智", 50, 100);
        let mut dice = ScriptedDice::new([4]);
        let d = parse("力量60 理智-1d6 幸运+5");
        let applied = apply_directive(&d, "pc", &mut store, &mut dice, 100).unwrap();

        assert_eq!(applied.card, "pc");
        assert_eq!(store.attribute("pc", "力量"), Some(60));
        assert_eq!(store.attribute("pc", "理智"), Some(46));
        assert_eq!(store.attribute("pc", "幸运"), Some(5));
        let rendered: Vec<String> = applied.changes.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["力量=60", "理智-1D6=4=46", "幸运+5=5"]);
    }

    #[test]
    fn apply_compound_dice() {
        let mut store = MemoryStore::new();
        store.set_attribute("pc", "生命", 12, 100);
        let mut dice = ScriptedDice::new([4, 2, 5]);
        let d = parse("hp-1d6+1 力量+2d6+3");
        let applied = apply_directive(&d, "pc", &mut store, &mut dice, 100).unwrap();
        assert_eq!(store.attribute("pc", "生命"), Some(7));
        assert_eq!(store.attribute("pc", "力量"), Some(10));
        assert_eq!(applied.changes[0].amount, 5);
        assert_eq!(applied.changes[1].amount, 10);
    }

    #[test]
    fn apply_uses_explicit_card() {
        let mut store = MemoryStore::new();
        let mut dice = ScriptedDice::default();
        let d = parse("Kokona--力量30");
        apply_directive(&d, "pc", &mut store, &mut dice, 100).unwrap();
        assert_eq!(store.attribute("Kokona", "力量"), Some(30));
        assert_eq!(store.attribute("pc", "力量"), None);
    }

    #[test]
    fn subtract_clamps_at_zero() {
        let mut store = MemoryStore::new();
        store.set_attribute("pc", "生命", 3, 100);
        let mut dice = ScriptedDice::default();
        let applied =
            apply_directive(&parse("hp-10"), "pc", &mut store, &mut dice, 100).unwrap();
        assert_eq!(applied.changes[0].value, 0);
        assert_eq!(applied.changes[0].previous, Some(3));
        assert_eq!(store.attribute("pc", "生命"), Some(0));
    }

    #[test]
    fn failed_roll_writes_nothing() {
        let mut store = MemoryStore::new();
        let mut dice = ScriptedDice::default();
        let d = parse("力量60 理智-1d6");
        assert!(apply_directive(&d, "pc", &mut store, &mut dice, 100).is_err());
        assert!(store.attributes("pc").is_empty());
    }

    #[test]
    fn cap_rejection_is_reported() {
        let mut store = MemoryStore::new();
        let mut dice = ScriptedDice::default();
        let applied =
            apply_directive(&parse("力量60 敏捷50"), "pc", &mut store, &mut dice, 1).unwrap();
        assert!(applied.changes[0].stored);
        assert!(!applied.changes[1].stored);
        assert_eq!(applied.stored().count(), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_is_total_and_deterministic(input in "\\PC{0,40}") {
                let a = parse(&input);
                let b = parse(&input);
                prop_assert_eq!(a, b);
            }

            #[test]
            fn parsed_names_are_canonical(input in "[力量敏捷strdexSAN0-9+:| -]{0,30}") {
                let catalog = standard_catalog();
                for op in parse(&input).operations {
                    prop_assert_eq!(catalog.canonical(&op.attribute), op.attribute.as_str());
                }
            }
        }
    }
}
