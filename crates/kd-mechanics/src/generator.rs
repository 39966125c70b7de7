//! Call of Cthulhu investigator generation.
//!
//! Rolls the characteristics of a 6th or 7th edition investigator and
//! derives hit points, magic points and sanity from them. The rendered line
//! (`力量STR=3D6*5=60/30/12 体质CON=...`) is the same text
//! [`parse_directive`](crate::directive::parse_directive) reads back when a
//! player pastes it into a card.

use std::fmt;
use std::str::FromStr;

use kd_core::RandomSource;
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Die size for the characteristic formulas.
const CHARACTERISTIC_FACES: u32 = 6;

/// Most investigators generated in one request.
pub const MAX_INVESTIGATORS: usize = 10;

/// Rules edition to generate for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edition {
    /// 6th edition: raw `3D6` characteristics, luck and sanity from POW.
    Sixth,
    /// 7th edition: percentile characteristics with half and fifth values.
    #[default]
    Seventh,
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sixth => write!(f, "6"),
            Self::Seventh => write!(f, "7"),
        }
    }
}

impl FromStr for Edition {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "6" => Ok(Self::Sixth),
            "7" => Ok(Self::Seventh),
            other => Err(MechError::Format(format!(
                "edition must be 6 or 7, got '{other}'"
            ))),
        }
    }
}

/// A rolled characteristic.
struct Characteristic {
    attribute: &'static str,
    tag: &'static str,
    formula: &'static str,
}

const fn characteristic(
    attribute: &'static str,
    tag: &'static str,
    formula: &'static str,
) -> Characteristic {
    Characteristic {
        attribute,
        tag,
        formula,
    }
}

const SEVENTH: [Characteristic; 9] = [
    characteristic("力量", "STR", "3D6*5"),
    characteristic("体质", "CON", "3D6*5"),
    characteristic("体型", "SIZ", "(2D6+6)*5"),
    characteristic("敏捷", "DEX", "3D6*5"),
    characteristic("外貌", "APP", "3D6*5"),
    characteristic("智力", "INT", "(2D6+6)*5"),
    characteristic("意志", "POW", "3D6*5"),
    characteristic("教育", "EDU", "(2D6+6)*5"),
    characteristic("幸运", "LUCK", "3D6*5"),
];

const SIXTH: [Characteristic; 8] = [
    characteristic("力量", "STR", "3D6"),
    characteristic("体质", "CON", "3D6"),
    characteristic("体型", "SIZ", "2D6+6"),
    characteristic("敏捷", "DEX", "3D6"),
    characteristic("外貌", "APP", "3D6"),
    characteristic("智力", "INT", "2D6+6"),
    characteristic("意志", "POW", "3D6"),
    characteristic("教育", "EDU", "3D6+3"),
];

/// One value on a generated sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStat {
    /// Canonical attribute name.
    pub attribute: String,
    /// Short English tag shown after the name, e.g. `STR`.
    pub tag: String,
    /// How the value was produced, e.g. `3D6*5` or `(CON+SIZ)/10`.
    pub formula: String,
    /// The value.
    pub value: i64,
    /// Whether to render the half and fifth values as well.
    pub with_fractions: bool,
}

impl fmt::Display for GeneratedStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}={}={}", self.attribute, self.tag, self.formula, self.value)?;
        if self.with_fractions {
            write!(f, "/{}/{}", self.value / 2, self.value / 5)?;
        }
        Ok(())
    }
}

/// A generated investigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigator {
    /// Edition the sheet follows.
    pub edition: Edition,
    /// Rolled characteristics, in sheet order.
    pub characteristics: Vec<GeneratedStat>,
    /// Values computed from the characteristics.
    pub derived: Vec<GeneratedStat>,
}

impl Investigator {
    /// Sum of every rolled characteristic.
    pub fn total(&self) -> i64 {
        self.characteristics.iter().map(|s| s.value).sum()
    }

    /// Value of a characteristic or derived stat by canonical name.
    pub fn get(&self, attribute: &str) -> Option<i64> {
        self.characteristics
            .iter()
            .chain(&self.derived)
            .find(|s| s.attribute == attribute)
            .map(|s| s.value)
    }
}

impl fmt::Display for Investigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stat) in self.characteristics.iter().chain(&self.derived).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{stat}")?;
        }
        Ok(())
    }
}

/// Roll one investigator.
pub fn generate(edition: Edition, dice: &mut dyn RandomSource) -> MechResult<Investigator> {
    let table: &[Characteristic] = match edition {
        Edition::Sixth => &SIXTH,
        Edition::Seventh => &SEVENTH,
    };

    let mut characteristics = Vec::with_capacity(table.len());
    for c in table {
        let roll = dice.roll(c.formula, CHARACTERISTIC_FACES)?;
        characteristics.push(GeneratedStat {
            attribute: c.attribute.to_string(),
            tag: c.tag.to_string(),
            formula: c.formula.to_string(),
            value: roll.total,
            with_fractions: edition == Edition::Seventh,
        });
    }

    let value_of = |tag: &str| {
        characteristics
            .iter()
            .find(|s| s.tag == tag)
            .map_or(0, |s| s.value)
    };
    let (con, siz, pow, int, edu) = (
        value_of("CON"),
        value_of("SIZ"),
        value_of("POW"),
        value_of("INT"),
        value_of("EDU"),
    );

    let derived = match edition {
        Edition::Seventh => vec![
            derived_stat("生命", "HP", "(CON+SIZ)/10", (con + siz) / 10),
            derived_stat("魔法", "MP", "POW/5", pow / 5),
            derived_stat("理智", "SAN", "POW", pow),
        ],
        Edition::Sixth => vec![
            derived_stat("生命", "HP", "(CON+SIZ)/2", (con + siz + 1) / 2),
            derived_stat("魔法", "MP", "POW", pow),
            derived_stat("理智", "SAN", "POW*5", pow * 5),
            derived_stat("幸运", "LUCK", "POW*5", pow * 5),
            derived_stat("灵感", "IDEA", "INT*5", int * 5),
            derived_stat("知识", "KNOW", "EDU*5", edu * 5),
        ],
    };

    let investigator = Investigator {
        edition,
        characteristics,
        derived,
    };
    tracing::debug!(%edition, total = investigator.total(), "investigator generated");
    Ok(investigator)
}

/// Roll `count` investigators, `1..=10`.
pub fn generate_many(
    edition: Edition,
    count: usize,
    dice: &mut dyn RandomSource,
) -> MechResult<Vec<Investigator>> {
    if !(1..=MAX_INVESTIGATORS).contains(&count) {
        return Err(MechError::Range(format!(
            "investigator count must be between 1 and {MAX_INVESTIGATORS}, got {count}"
        )));
    }
    (0..count).map(|_| generate(edition, dice)).collect()
}

fn derived_stat(attribute: &str, tag: &str, formula: &str, value: i64) -> GeneratedStat {
    GeneratedStat {
        attribute: attribute.to_string(),
        tag: tag.to_string(),
        formula: formula.to_string(),
        value,
        with_fractions: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{OpKind, OpValue, parse_directive};
    use kd_core::{ScriptedDice, standard_catalog};

    /// Faces for a 7th edition sheet: STR 60, CON 50, SIZ 65, DEX 45,
    /// APP 40, INT 70, POW 55, EDU 80, LUCK 50.
    const SEVENTH_FACES: [u32; 24] = [
        4, 4, 4, // STR 12
        3, 3, 4, // CON 10
        3, 4, // SIZ 7+6
        3, 3, 3, // DEX 9
        2, 3, 3, // APP 8
        4, 4, // INT 8+6
        3, 4, 4, // POW 11
        5, 5, // EDU 10+6
        3, 3, 4, // LUCK 10
    ];

    #[test]
    fn seventh_edition_sheet() {
        let mut dice = ScriptedDice::new(SEVENTH_FACES);
        let inv = generate(Edition::Seventh, &mut dice).unwrap();
        assert_eq!(dice.remaining(), 0);

        assert_eq!(inv.get("力量"), Some(60));
        assert_eq!(inv.get("体型"), Some(65));
        assert_eq!(inv.get("教育"), Some(80));
        assert_eq!(inv.get("幸运"), Some(50));
        assert_eq!(inv.get("生命"), Some(11));
        assert_eq!(inv.get("魔法"), Some(11));
        assert_eq!(inv.get("理智"), Some(55));
        assert_eq!(inv.total(), 515);

        let line = inv.to_string();
        assert!(line.starts_with("力量STR=3D6*5=60/30/12 体质CON=3D6*5=50/25/10"), "{line}");
        assert!(line.contains("体型SIZ=(2D6+6)*5=65/32/13"), "{line}");
        assert!(line.ends_with("生命HP=(CON+SIZ)/10=11 魔法MP=POW/5=11 理智SAN=POW=55"), "{line}");
    }

    #[test]
    fn sixth_edition_sheet() {
        let faces = [4, 4, 4, 3, 3, 4, 3, 4, 3, 3, 3, 2, 3, 3, 4, 4, 3, 4, 4, 5, 5, 5];
        let mut dice = ScriptedDice::new(faces);
        let inv = generate(Edition::Sixth, &mut dice).unwrap();
        assert_eq!(dice.remaining(), 0);

        assert_eq!(inv.get("力量"), Some(12));
        assert_eq!(inv.get("体质"), Some(10));
        assert_eq!(inv.get("体型"), Some(13));
        assert_eq!(inv.get("教育"), Some(18));
        assert_eq!(inv.get("生命"), Some(12));
        assert_eq!(inv.get("理智"), Some(55));
        assert_eq!(inv.get("幸运"), Some(55));
        assert_eq!(inv.get("知识"), Some(90));
        assert!(inv.to_string().starts_with("力量STR=3D6=12 "));
    }

    #[test]
    fn sheet_reads_back_as_a_directive() {
        let mut dice = ScriptedDice::new(SEVENTH_FACES);
        let inv = generate(Edition::Seventh, &mut dice).unwrap();
        let directive = parse_directive(&inv.to_string(), standard_catalog());

        assert_eq!(directive.operations.len(), 12);
        for op in &directive.operations {
            assert_eq!(op.kind, OpKind::Set);
            assert_eq!(op.value, OpValue::Literal(inv.get(&op.attribute).unwrap()));
        }
    }

    #[test]
    fn edition_from_str() {
        assert_eq!("6".parse::<Edition>().unwrap(), Edition::Sixth);
        assert_eq!(" 7 ".parse::<Edition>().unwrap(), Edition::Seventh);
        assert!(matches!("5".parse::<Edition>(), Err(MechError::Format(_))));
    }

    #[test]
    fn count_is_bounded() {
        let mut dice = ScriptedDice::default();
        for count in [0, 11] {
            assert!(matches!(
                generate_many(Edition::Seventh, count, &mut dice),
                Err(MechError::Range(_))
            ));
        }
    }

    #[test]
    fn several_sheets() {
        let faces: Vec<u32> = SEVENTH_FACES.iter().chain(&SEVENTH_FACES).copied().collect();
        let mut dice = ScriptedDice::new(faces);
        let sheets = generate_many(Edition::Seventh, 2, &mut dice).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0], sheets[1]);
    }

    #[test]
    fn exhausted_dice_is_an_error() {
        let mut dice = ScriptedDice::new([3, 3]);
        assert!(matches!(
            generate(Edition::Seventh, &mut dice),
            Err(MechError::RandomSource(_))
        ));
    }
}
