//! # Item Catalog
//!
//! Owns every [`Item`] and keeps two indexes over them:
//!
//! - `name → item`, for lookups coming from recipes and user selections
//! - `property → item names`, built from each item's *visible* properties
//!
//! Property names are case-insensitive. The first spelling the catalog sees
//! becomes canonical and every later item is rewritten to use it, so
//! "Restore Health" and "restore health" are one property.
//!
//! The property index always reflects the catalog's current [`Mastery`].
//! Changing the mastery re-applies it to every item and rebuilds the index
//! from scratch; adding a single item updates it incrementally.
//!
//! Items are held behind `Rc` so combinations can share them. A reveal change
//! copies-on-write, leaving combinations mixed earlier untouched.

use crate::error::{AlchemyError, Result};
use crate::model::{fold_name, normalize_name, Item, ItemRecord, Mastery, PropertySet};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

static NO_ITEMS: BTreeSet<String> = BTreeSet::new();

#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Rc<Item>>,
    by_name: HashMap<String, usize>,
    by_property: BTreeMap<String, BTreeSet<String>>,
    origins: BTreeSet<String>,
    // folded name → canonical spelling, over every declared slot
    spellings: HashMap<String, String>,
    mastery: Mastery,
}

impl ItemCatalog {
    pub fn new(mastery: Mastery) -> Self {
        Self {
            mastery,
            ..Self::default()
        }
    }

    pub fn from_records<I>(records: I, mastery: Mastery) -> Result<Self>
    where
        I: IntoIterator<Item = ItemRecord>,
    {
        let mut catalog = Self::new(mastery);
        for record in records {
            catalog.add(Item::from_record(&record))?;
        }
        debug!(
            items = catalog.len(),
            properties = catalog.by_property.len(),
            "catalog built"
        );
        Ok(catalog)
    }

    /// Adds one item, applying the catalog's mastery to it.
    ///
    /// Names are unique within a catalog; a second item with a known name is
    /// rejected and the catalog is left unchanged.
    pub fn add(&mut self, mut item: Item) -> Result<()> {
        if self.by_name.contains_key(item.name()) {
            return Err(AlchemyError::DuplicateItem(item.name().to_string()));
        }
        for property in item.slots().iter().flatten() {
            self.spellings
                .entry(fold_name(property))
                .or_insert_with(|| property.clone());
        }
        let spellings = &self.spellings;
        item.respell_properties(|p| {
            spellings
                .get(&fold_name(p))
                .cloned()
                .unwrap_or_else(|| p.to_string())
        });
        item.apply_mastery(self.mastery);
        let item = Rc::new(item);
        self.by_name.insert(item.name().to_string(), self.items.len());
        self.index_item(&item);
        self.items.push(item);
        Ok(())
    }

    pub fn mastery(&self) -> Mastery {
        self.mastery
    }

    /// Sets the catalog-wide reveal level from a raw integer.
    pub fn set_reveal_level(&mut self, level: i64) -> Result<()> {
        self.apply_mastery(Mastery::try_from(level)?);
        Ok(())
    }

    pub fn apply_mastery(&mut self, mastery: Mastery) {
        self.mastery = mastery;
        for item in self.items.iter_mut() {
            Rc::make_mut(item).apply_mastery(mastery);
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.by_property.clear();
        self.origins.clear();
        let items = std::mem::take(&mut self.items);
        for item in &items {
            self.index_item(item);
        }
        self.items = items;
        debug!(
            mastery = %self.mastery,
            properties = self.by_property.len(),
            "property index rebuilt"
        );
    }

    fn index_item(&mut self, item: &Item) {
        if !item.origin().is_empty() {
            self.origins.insert(item.origin().to_string());
        }
        for property in item.visible_properties() {
            self.by_property
                .entry(property.clone())
                .or_default()
                .insert(item.name().to_string());
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Rc<Item>> {
        self.by_name.get(name).map(|&idx| &self.items[idx])
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Rc<Item>] {
        &self.items
    }

    /// Item names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every property visible on at least one item, sorted.
    pub fn all_properties(&self) -> BTreeSet<String> {
        self.by_property.keys().cloned().collect()
    }

    /// The catalog's spelling of `name`, matched case-insensitively.
    pub fn canonical_property(&self, name: &str) -> Option<&str> {
        self.spellings.get(&fold_name(name)).map(String::as_str)
    }

    /// Maps each name to its canonical spelling. Unknown names are only
    /// whitespace-normalized.
    pub fn canonical_key<'a, I>(&self, properties: I) -> PropertySet
    where
        I: IntoIterator<Item = &'a String>,
    {
        properties
            .into_iter()
            .map(|p| {
                self.canonical_property(p)
                    .map(str::to_string)
                    .unwrap_or_else(|| normalize_name(p))
            })
            .collect()
    }

    pub fn items_with_property(&self, property: &str) -> &BTreeSet<String> {
        self.canonical_property(property)
            .and_then(|canonical| self.by_property.get(canonical))
            .unwrap_or(&NO_ITEMS)
    }

    pub fn items_with_any_property<'a, I>(&self, properties: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        properties
            .into_iter()
            .flat_map(|p| self.items_with_property(p).iter().cloned())
            .collect()
    }

    pub fn origins(&self) -> &BTreeSet<String> {
        &self.origins
    }

    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(|item| item.to_record()).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    List(Vec<ItemRecord>),
    Wrapped { items: Vec<ItemRecord> },
}

/// Reads item records from a JSON file holding either an array of records or
/// an object with an `items` array.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ItemRecord>> {
    let content = fs::read_to_string(path.as_ref()).map_err(AlchemyError::Io)?;
    parse_records(&content)
}

pub fn parse_records(content: &str) -> Result<Vec<ItemRecord>> {
    let doc: RecordDocument = serde_json::from_str(content).map_err(AlchemyError::Serialization)?;
    Ok(match doc {
        RecordDocument::List(items) | RecordDocument::Wrapped { items } => items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, slots: [Option<&str>; 4]) -> ItemRecord {
        let [slot0, slot1, slot2, slot3] = slots.map(|s| s.map(str::to_string));
        ItemRecord {
            origin: "Base".to_string(),
            name: name.to_string(),
            external_id: String::new(),
            weight: 0.1,
            value: 1,
            slot0,
            slot1,
            slot2,
            slot3,
        }
    }

    fn catalog(mastery: Mastery) -> ItemCatalog {
        ItemCatalog::from_records(
            vec![
                record("Alpha", [Some("X"), Some("Y"), Some("Q"), Some("R")]),
                record("Beta", [Some("X"), Some("Z"), None, None]),
                record("Gamma", [Some("Y"), Some("Z"), Some("R"), None]),
            ],
            mastery,
        )
        .unwrap()
    }

    #[test]
    fn test_reverse_index_at_full_reveal() {
        let cat = catalog(Mastery::Master);
        let x: Vec<_> = cat.items_with_property("X").iter().cloned().collect();
        assert_eq!(x, vec!["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(cat.items_with_property("R").len(), 2);
        assert_eq!(cat.all_properties().len(), 5);
    }

    #[test]
    fn test_property_names_are_case_insensitive() {
        let cat = ItemCatalog::from_records(
            vec![
                record("Alpha", [Some("Restore Health"), Some("X"), None, None]),
                record("Beta", [Some("restore  HEALTH"), None, None, None]),
            ],
            Mastery::Master,
        )
        .unwrap();
        assert_eq!(
            cat.all_properties(),
            ["Restore Health", "X"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
        );
        assert_eq!(cat.items_with_property("RESTORE HEALTH").len(), 2);
        assert_eq!(cat.canonical_property("restore health"), Some("Restore Health"));
        assert_eq!(cat.lookup("Beta").unwrap().slot(0), Some("Restore Health"));

        let wanted = vec!["x".to_string(), "Fortify  Luck".to_string()];
        let canonical = cat.canonical_key(&wanted);
        assert!(canonical.contains("X"));
        assert!(canonical.contains("Fortify Luck"));
    }

    #[test]
    fn test_reverse_index_respects_mastery() {
        let mut cat = catalog(Mastery::Novice);
        assert!(cat.items_with_property("Z").is_empty());
        assert_eq!(cat.all_properties().len(), 2); // X, Y

        cat.set_reveal_level(1).unwrap();
        assert_eq!(cat.items_with_property("Z").len(), 2);
        assert!(cat.items_with_property("R").is_empty());

        for item in cat.items() {
            assert_eq!(item.reveal_level(), Mastery::Apprentice);
        }
    }

    #[test]
    fn test_invalid_level_keeps_state() {
        let mut cat = catalog(Mastery::Expert);
        assert!(matches!(
            cat.set_reveal_level(9),
            Err(AlchemyError::InvalidLevel(9))
        ));
        assert_eq!(cat.mastery(), Mastery::Expert);
        assert_eq!(cat.all_properties().len(), 5);
    }

    #[test]
    fn test_add_updates_indexes_incrementally() {
        let mut cat = catalog(Mastery::Expert);
        let mut extra = Item::from_record(&record("Delta", [Some("W"), Some("X"), None, None]));
        extra.apply_mastery(Mastery::Novice);
        cat.add(extra).unwrap();

        let delta = cat.lookup("Delta").unwrap();
        // Catalog mastery wins over the item's own level
        assert_eq!(delta.reveal_level(), Mastery::Expert);
        assert!(cat.items_with_property("W").contains("Delta"));
        assert_eq!(cat.items_with_property("X").len(), 3);
        assert_eq!(cat.len(), 4);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut cat = catalog(Mastery::Expert);
        let dup = Item::from_record(&record("Beta", [Some("Other"), None, None, None]));
        assert!(matches!(cat.add(dup), Err(AlchemyError::DuplicateItem(n)) if n == "Beta"));
        assert_eq!(cat.len(), 3);
        assert!(cat.items_with_property("Other").is_empty());
    }

    #[test]
    fn test_lookups_on_missing_data_are_empty() {
        let cat = catalog(Mastery::Expert);
        assert!(cat.lookup("Nope").is_none());
        assert!(cat.items_with_property("Nope").is_empty());
    }

    #[test]
    fn test_items_with_any_property() {
        let cat = catalog(Mastery::Expert);
        let props: BTreeSet<String> = ["X", "Z"].iter().map(|s| s.to_string()).collect();
        let names = cat.items_with_any_property(&props);
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_origins_and_names() {
        let cat = catalog(Mastery::Expert);
        assert_eq!(cat.origins().len(), 1);
        assert_eq!(cat.names(), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_mastery_change_leaves_shared_items_untouched() {
        let mut cat = catalog(Mastery::Master);
        let held = Rc::clone(cat.lookup("Alpha").unwrap());
        cat.apply_mastery(Mastery::Novice);
        assert_eq!(held.visible_properties().len(), 4);
        assert_eq!(cat.lookup("Alpha").unwrap().visible_properties().len(), 1);
    }

    #[test]
    fn test_parse_records_accepts_both_shapes() {
        let list = r#"[{"name": "A", "slot0": "X"}]"#;
        let wrapped = r#"{"items": [{"name": "A", "slot0": "X"}, {"name": "B"}]}"#;
        assert_eq!(parse_records(list).unwrap().len(), 1);
        assert_eq!(parse_records(wrapped).unwrap().len(), 2);
        assert!(parse_records("{\"nope\": 1}").is_err());
    }
}
