//! Canonical attribute names and their aliases.
//!
//! Character sheets are written by hand, so the same stat shows up as `STR`,
//! `strength` or `力量`. Every name passes through [`AttributeCatalog::canonical`]
//! before it touches a store, which keeps one spelling per stat on disk.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// The canonical stat names known to the engine.
pub const CANONICAL_ATTRIBUTES: &[&str] = &[
    "力量",
    "体质",
    "体型",
    "敏捷",
    "外貌",
    "智力",
    "意志",
    "教育",
    "幸运",
    "理智",
    "生命",
    "魔法",
    "伤害加值",
    "移动力",
];

/// Alternate spellings, grouped by canonical name.
const ALIASES: &[(&str, &[&str])] = &[
    ("力量", &["str", "strength"]),
    ("体质", &["con", "constitution"]),
    ("体型", &["siz", "size"]),
    ("敏捷", &["dex", "dexterity"]),
    ("外貌", &["app", "appearance"]),
    ("智力", &["int", "intelligence"]),
    ("意志", &["pow", "power"]),
    ("教育", &["edu", "education"]),
    ("幸运", &["luck", "luk"]),
    ("理智", &["san", "sanity"]),
    ("生命", &["hp", "生命值"]),
    ("魔法", &["mp", "魔法值"]),
    ("伤害加值", &["db", "伤害奖励"]),
    ("移动力", &["mov", "move"]),
];

static STANDARD: LazyLock<AttributeCatalog> = LazyLock::new(AttributeCatalog::standard);

/// The process-wide catalog, built on first use and never mutated.
pub fn standard_catalog() -> &'static AttributeCatalog {
    &STANDARD
}

/// Case-insensitive lookup from any known spelling to a canonical name.
#[derive(Debug, Clone)]
pub struct AttributeCatalog {
    lookup: HashMap<String, &'static str>,
}

impl AttributeCatalog {
    /// Build the catalog covering the standard investigator stats.
    pub fn standard() -> Self {
        let mut lookup = HashMap::new();
        for canonical in CANONICAL_ATTRIBUTES {
            lookup.insert((*canonical).to_string(), *canonical);
        }
        for (canonical, aliases) in ALIASES {
            for alias in *aliases {
                lookup.insert(alias.to_lowercase(), *canonical);
            }
        }
        Self { lookup }
    }

    /// Resolve a name to its canonical form.
    ///
    /// Unknown names are returned trimmed but otherwise untouched, so custom
    /// skills like `侦查` or `Spot Hidden` keep the spelling the player chose.
    pub fn canonical<'a>(&self, name: &'a str) -> Cow<'a, str> {
        let trimmed = name.trim();
        match self.lookup.get(&trimmed.to_lowercase()) {
            Some(canonical) if *canonical == trimmed => Cow::Borrowed(trimmed),
            Some(canonical) => Cow::Owned((*canonical).to_string()),
            None => Cow::Borrowed(trimmed),
        }
    }

    /// Returns true if the name is a known canonical name or alias.
    pub fn is_known(&self, name: &str) -> bool {
        self.lookup.contains_key(&name.trim().to_lowercase())
    }

    /// Every spelling that resolves to `canonical`, including itself.
    pub fn spellings_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lookup
            .iter()
            .filter(move |(_, target)| **target == canonical)
            .map(|(spelling, _)| spelling.as_str())
    }
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_map_to_themselves() {
        let catalog = AttributeCatalog::standard();
        for name in CANONICAL_ATTRIBUTES {
            assert_eq!(catalog.canonical(name), *name);
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        let catalog = AttributeCatalog::standard();
        assert_eq!(catalog.canonical("STR"), "力量");
        assert_eq!(catalog.canonical("Dex"), "敏捷");
        assert_eq!(catalog.canonical(" san "), "理智");
        assert_eq!(catalog.canonical("生命值"), "生命");
    }

    #[test]
    fn unknown_names_pass_through() {
        let catalog = AttributeCatalog::standard();
        assert_eq!(catalog.canonical("侦查"), "侦查");
        assert_eq!(catalog.canonical("Spot Hidden"), "Spot Hidden");
        assert!(!catalog.is_known("侦查"));
    }

    #[test]
    fn spellings_include_canonical_and_aliases() {
        let catalog = AttributeCatalog::standard();
        let mut spellings: Vec<&str> = catalog.spellings_of("理智").collect();
        spellings.sort_unstable();
        assert_eq!(spellings, vec!["san", "sanity", "理智"]);
    }

    #[test]
    fn standard_catalog_is_shared() {
        let a = standard_catalog() as *const AttributeCatalog;
        let b = standard_catalog() as *const AttributeCatalog;
        assert_eq!(a, b);
    }
}
