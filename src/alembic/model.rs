use crate::error::{AlchemyError, Result};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Number of property slots an item can declare.
pub const SLOT_COUNT: usize = 4;

/// A set of property names. Sorted, so it doubles as a canonical map key.
pub type PropertySet = BTreeSet<String>;

/// Canonical identity of a combination: the names of its items.
pub type ItemKey = BTreeSet<String>;

/// Canonical identity of a combination's result: its derived property set.
pub type PropertyKey = PropertySet;

/// Trims a name and collapses internal whitespace runs to one space.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison form of a property name: normalized, then lowercased.
/// Two spellings with the same folded form name the same property.
pub fn fold_name(raw: &str) -> String {
    normalize_name(raw).to_lowercase()
}

/// How many leading property slots of an item are visible.
///
/// Slot `i` is visible when `i <= level`, so `Expert` and `Master` both
/// reveal all four slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "i64")]
pub enum Mastery {
    Novice = 0,
    Apprentice = 1,
    Journeyman = 2,
    #[default]
    Expert = 3,
    Master = 4,
}

impl Mastery {
    pub const ALL: [Mastery; 5] = [
        Mastery::Novice,
        Mastery::Apprentice,
        Mastery::Journeyman,
        Mastery::Expert,
        Mastery::Master,
    ];

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Mastery {
    type Error = AlchemyError;

    fn try_from(level: i64) -> Result<Self> {
        usize::try_from(level)
            .ok()
            .and_then(|idx| Mastery::ALL.get(idx).copied())
            .ok_or(AlchemyError::InvalidLevel(level))
    }
}

impl From<Mastery> for u8 {
    fn from(m: Mastery) -> u8 {
        m.level()
    }
}

impl fmt::Display for Mastery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mastery::Novice => "novice",
            Mastery::Apprentice => "apprentice",
            Mastery::Journeyman => "journeyman",
            Mastery::Expert => "expert",
            Mastery::Master => "master",
        };
        write!(f, "{} ({})", label, self.level())
    }
}

/// A named trait an item may exhibit.
///
/// `status` is a polarity hint for callers (negative effects are `-1`); it
/// never takes part in mixing or validity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub status: i32,
}

impl Property {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_name(name),
            status: 0,
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Raw item record as supplied by catalog sources and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub origin: String,
    pub name: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot3: Option<String>,
}

/// A catalog entry with up to four gated properties.
#[derive(Debug, Clone)]
pub struct Item {
    origin: String,
    name: String,
    external_id: String,
    weight: f64,
    value: u64,
    slots: [Option<String>; SLOT_COUNT],
    reveal: Mastery,
    // Lazily rebuilt after every reveal change.
    visible: OnceCell<PropertySet>,
}

impl Item {
    pub fn new(
        name: &str,
        origin: &str,
        external_id: &str,
        weight: f64,
        value: u64,
        slots: [Option<&str>; SLOT_COUNT],
    ) -> Self {
        let slots = slots.map(|s| {
            s.map(normalize_name)
                .filter(|normalized| !normalized.is_empty())
        });
        let reveal = initial_reveal(&slots);
        Self {
            origin: origin.trim().to_string(),
            name: normalize_name(name),
            external_id: external_id.trim().to_string(),
            weight,
            value,
            slots,
            reveal,
            visible: OnceCell::new(),
        }
    }

    pub fn from_record(record: &ItemRecord) -> Self {
        Self::new(
            &record.name,
            &record.origin,
            &record.external_id,
            record.weight,
            record.value,
            [
                record.slot0.as_deref(),
                record.slot1.as_deref(),
                record.slot2.as_deref(),
                record.slot3.as_deref(),
            ],
        )
    }

    pub fn to_record(&self) -> ItemRecord {
        let [slot0, slot1, slot2, slot3] = self.slots.clone();
        ItemRecord {
            origin: self.origin.clone(),
            name: self.name.clone(),
            external_id: self.external_id.clone(),
            weight: self.weight,
            value: self.value,
            slot0,
            slot1,
            slot2,
            slot3,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    pub fn slots(&self) -> &[Option<String>; SLOT_COUNT] {
        &self.slots
    }

    /// Number of declared properties before the first empty slot.
    pub fn property_count(&self) -> usize {
        self.slots.iter().take_while(|s| s.is_some()).count()
    }

    pub fn reveal_level(&self) -> Mastery {
        self.reveal
    }

    /// Sets the reveal level from a raw integer.
    pub fn set_reveal_level(&mut self, level: i64) -> Result<()> {
        self.apply_mastery(Mastery::try_from(level)?);
        Ok(())
    }

    pub fn apply_mastery(&mut self, mastery: Mastery) {
        self.reveal = mastery;
        self.visible = OnceCell::new();
    }

    /// Properties in slots `0..=reveal_level` that are non-empty.
    pub fn visible_properties(&self) -> &PropertySet {
        self.visible.get_or_init(|| {
            self.slots
                .iter()
                .enumerate()
                .filter(|(i, _)| *i <= self.reveal.level() as usize)
                .filter_map(|(_, s)| s.clone())
                .collect()
        })
    }

    /// Rewrites every declared property through `spell`.
    pub(crate) fn respell_properties<F>(&mut self, mut spell: F)
    where
        F: FnMut(&str) -> String,
    {
        for slot in self.slots.iter_mut().flatten() {
            let respelled = spell(slot);
            *slot = respelled;
        }
        self.visible = OnceCell::new();
    }

    /// Fills the first empty slot. Returns `false` when all slots are taken.
    pub fn push_property(&mut self, property: &str) -> bool {
        let normalized = normalize_name(property);
        if normalized.is_empty() {
            return false;
        }
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(normalized);
                self.visible = OnceCell::new();
                true
            }
            None => false,
        }
    }

    fn identity(&self) -> (&str, &str, &str, &[Option<String>; SLOT_COUNT], u64, u64) {
        (
            &self.origin,
            &self.name,
            &self.external_id,
            &self.slots,
            self.weight.to_bits(),
            self.value,
        )
    }
}

/// The leading run of non-empty slots decides the initial level; a gap ends it.
fn initial_reveal(slots: &[Option<String>; SLOT_COUNT]) -> Mastery {
    let leading = slots.iter().take_while(|s| s.is_some()).count();
    let level = leading.saturating_sub(1);
    Mastery::ALL[level]
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.identity().cmp(&other.identity()))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, slots: [Option<&str>; 4]) -> Item {
        Item::new(name, "Base", "0001", 0.1, 5, slots)
    }

    #[test]
    fn test_visible_properties_follow_reveal_level() {
        let mut it = item(
            "Wisp Wrappings",
            [Some("Restore Stamina"), Some("Fortify Destruction"), Some("Fortify Carry Weight"), Some("Resist Magic")],
        );
        assert_eq!(it.reveal_level(), Mastery::Expert);
        assert_eq!(it.visible_properties().len(), 4);

        it.set_reveal_level(0).unwrap();
        let visible: Vec<_> = it.visible_properties().iter().cloned().collect();
        assert_eq!(visible, vec!["Restore Stamina".to_string()]);

        it.set_reveal_level(2).unwrap();
        assert_eq!(it.visible_properties().len(), 3);
        assert!(!it.visible_properties().contains("Resist Magic"));
    }

    #[test]
    fn test_invalid_reveal_level() {
        let mut it = item("Salt Pile", [Some("Weakness to Magic"), None, None, None]);
        assert!(matches!(it.set_reveal_level(5), Err(AlchemyError::InvalidLevel(5))));
        assert!(matches!(it.set_reveal_level(-1), Err(AlchemyError::InvalidLevel(-1))));
        // Level is untouched after a failed update
        assert_eq!(it.reveal_level(), Mastery::Novice);
    }

    #[test]
    fn test_gap_terminates_initial_level() {
        let it = item("Gapped", [Some("A"), Some("B"), None, Some("D")]);
        assert_eq!(it.property_count(), 2);
        assert_eq!(it.reveal_level(), Mastery::Apprentice);
        assert_eq!(it.visible_properties().len(), 2);

        let mut revealed = it.clone();
        revealed.apply_mastery(Mastery::Master);
        // Slots past a gap still become visible once revealed
        assert!(revealed.visible_properties().contains("D"));
    }

    #[test]
    fn test_blank_slots_are_absent() {
        let it = item("Blank", [Some("A"), Some("   "), None, None]);
        assert_eq!(it.slot(1), None);
        assert_eq!(it.property_count(), 1);
    }

    #[test]
    fn test_names_are_whitespace_normalized() {
        let it = item("  Blue   Mountain Flower ", [Some(" Restore  Health "), None, None, None]);
        assert_eq!(it.name(), "Blue Mountain Flower");
        assert_eq!(it.slot(0), Some("Restore Health"));
    }

    #[test]
    fn test_equality_ignores_reveal_level() {
        let a = item("Nightshade", [Some("A"), Some("B"), None, None]);
        let mut b = a.clone();
        b.apply_mastery(Mastery::Novice);
        assert_eq!(a, b);

        let c = Item::new("Nightshade", "Base", "0001", 0.2, 5, [Some("A"), Some("B"), None, None]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ordering_is_by_name() {
        let mut items = vec![
            item("Wheat", [None, None, None, None]),
            item("Bear Claws", [None, None, None, None]),
            item("Mora Tapinella", [None, None, None, None]),
        ];
        items.sort();
        let names: Vec<_> = items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Bear Claws", "Mora Tapinella", "Wheat"]);
    }

    #[test]
    fn test_push_property() {
        let mut it = item("Growing", [Some("A"), None, None, None]);
        assert!(it.push_property("B"));
        assert!(it.push_property("C"));
        assert!(it.push_property("D"));
        assert!(!it.push_property("E"));
        it.apply_mastery(Mastery::Master);
        assert_eq!(it.visible_properties().len(), 4);
    }

    #[test]
    fn test_record_roundtrip_preserves_identity() {
        let it = item("Garlic", [Some("Resist Poison"), Some("Fortify Stamina"), None, None]);
        let back = Item::from_record(&it.to_record());
        assert_eq!(it, back);
    }

    #[test]
    fn test_record_deserialize_with_defaults() {
        let json = r#"{"name": "Frost Salts", "slot0": "Frost Damage", "weight": 0.25}"#;
        let record: ItemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.value, 0);
        assert_eq!(record.origin, "");
        let it = Item::from_record(&record);
        assert_eq!(it.property_count(), 1);
    }

    #[test]
    fn test_mastery_conversion() {
        assert_eq!(Mastery::try_from(4).unwrap(), Mastery::Master);
        assert!(Mastery::try_from(7).is_err());
        let json = serde_json::to_string(&Mastery::Journeyman).unwrap();
        assert_eq!(json, "2");
        let parsed: Mastery = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, Mastery::Expert);
        assert!(serde_json::from_str::<Mastery>("9").is_err());
    }
}
