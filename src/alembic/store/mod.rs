//! # Snapshot Storage
//!
//! Computing recipes is expensive, so an [`Engine`] can be captured into a
//! [`Snapshot`] and restored later. The [`SnapshotStore`] trait keeps the
//! engine decoupled from where snapshots live.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage, one gzip-compressed JSON file
//! - [`memory::InMemoryStore`]: keeps the compressed bytes in memory, for tests
//!
//! ## Snapshot Format
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "maxItemsPerCombination": 3,
//!   "revealLevel": 3,
//!   "items":      [ {origin, name, externalId, weight, value, slot0..slot3}, ... ],
//!   "properties": [ {name, status}, ... ],
//!   "recipes":    [ ["Item A", "Item B"], ... ],        // optional
//!   "potions":    [ ["Property X", "Property Y"], ... ]  // optional
//! }
//! ```
//!
//! `recipes` lists every item key and rebuilds full combinations on load.
//! `potions` lists every property key; on its own it only restores which
//! property sets are reachable, as empty placeholders to be filled by
//! research. That is much faster to load for very large catalogs.

use crate::catalog::ItemCatalog;
use crate::combination::Combination;
use crate::engine::{check_combination_size, Engine, MIN_COMBINATION_SIZE};
use crate::error::{AlchemyError, Result};
use crate::model::{normalize_name, ItemRecord, Mastery, Property};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{self, Read, Write};
use std::rc::Rc;
use tracing::{debug, info};

pub mod fs;
pub mod memory;

pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    #[serde(default)]
    pub max_items_per_combination: Option<usize>,
    #[serde(default)]
    pub reveal_level: Mastery,
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potions: Option<Vec<Vec<String>>>,
}

/// Which computed sections to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub recipes: bool,
    pub potions: bool,
}

impl SaveOptions {
    /// Both sections: reloads without any recomputation.
    pub fn full() -> Self {
        Self {
            recipes: true,
            potions: true,
        }
    }

    /// Property keys only: small and fast to load.
    pub fn lite() -> Self {
        Self {
            recipes: false,
            potions: true,
        }
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::full()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replaces the snapshot's own bound.
    pub max_items_override: Option<usize>,
    pub load_recipes: bool,
    pub load_potions: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_items_override: None,
            load_recipes: true,
            load_potions: true,
        }
    }
}

impl Snapshot {
    pub fn capture(engine: &Engine, options: SaveOptions) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            max_items_per_combination: Some(engine.max_items_per_combination()),
            reveal_level: engine.catalog().mastery(),
            items: engine.catalog().to_records(),
            properties: engine.properties().cloned().collect(),
            recipes: options.recipes.then(|| key_lists(engine.item_keys())),
            potions: options.potions.then(|| key_lists(engine.property_keys())),
        }
    }

    /// Rebuilds an engine. Recipes are re-mixed and must still be valid
    /// combinations of at least two distinct items; potion keys not produced
    /// by a recipe become empty placeholders.
    pub fn restore(self, options: &LoadOptions) -> Result<Engine> {
        let max_items = options
            .max_items_override
            .or(self.max_items_per_combination)
            .ok_or_else(|| {
                AlchemyError::MalformedSnapshot("missing maxItemsPerCombination".to_string())
            })?;
        check_combination_size(max_items)?;

        let catalog = ItemCatalog::from_records(self.items, self.reveal_level)?;
        let mut engine = Engine::new(catalog, max_items)?;
        for property in self.properties {
            engine.register_property(Property::new(&property.name).with_status(property.status));
        }

        if options.load_recipes {
            for recipe in self.recipes.unwrap_or_default() {
                let members = recipe
                    .iter()
                    .map(|name| {
                        let name = normalize_name(name);
                        engine.catalog().lookup(&name).map(Rc::clone).ok_or_else(|| {
                            AlchemyError::MalformedSnapshot(format!(
                                "recipe references unknown item '{}'",
                                name
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut combination = Combination::new(members);
                if combination.len() < MIN_COMBINATION_SIZE || !combination.mix().check() {
                    return Err(AlchemyError::MalformedSnapshot(format!(
                        "recipe {} is not a valid combination",
                        recipe.join(" + ")
                    )));
                }
                engine.accept(combination);
            }
        }

        if options.load_potions {
            for potion in self.potions.unwrap_or_default() {
                let key = engine.catalog().canonical_key(&potion);
                engine.seed_property_key(key);
            }
        }

        info!(
            items = engine.catalog().len(),
            recipes = engine.recipe_count(),
            potions = engine.property_key_count(),
            "snapshot restored"
        );
        Ok(engine)
    }
}

fn key_lists<'a, I>(keys: I) -> Vec<Vec<String>>
where
    I: Iterator<Item = &'a BTreeSet<String>>,
{
    keys.map(|k| k.iter().cloned().collect()).collect()
}

/// Writes `snapshot` as gzip-compressed JSON.
pub fn encode<W: Write>(writer: W, snapshot: &Snapshot) -> Result<()> {
    let mut enc = GzEncoder::new(writer, Compression::default());
    serde_json::to_writer(&mut enc, snapshot).map_err(AlchemyError::Serialization)?;
    enc.finish().map_err(AlchemyError::Io)?;
    Ok(())
}

/// Reads a gzip-compressed JSON snapshot.
pub fn decode<R: Read>(reader: R) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_reader(GzDecoder::new(reader)).map_err(malformed)?;
    debug!(
        version = %snapshot.version,
        items = snapshot.items.len(),
        "snapshot decoded"
    );
    Ok(snapshot)
}

fn malformed(err: serde_json::Error) -> AlchemyError {
    if err.is_io() {
        let io_err = io::Error::from(err);
        return match io_err.kind() {
            // Not gzip, corrupt, or truncated
            io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidData
            | io::ErrorKind::UnexpectedEof => {
                AlchemyError::MalformedSnapshot(io_err.to_string())
            }
            _ => AlchemyError::Io(io_err),
        };
    }
    AlchemyError::MalformedSnapshot(err.to_string())
}

/// Abstract interface for snapshot persistence.
///
/// Loads and saves are whole-snapshot operations; there are no partial
/// updates.
pub trait SnapshotStore {
    /// Load the stored snapshot, or `None` when nothing was saved yet
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable location, for messages
    fn location(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryStore;
    use super::*;
    use crate::model::{ItemKey, PropertyKey};
    use crate::test_utils::{engine, five_items, key, record};

    fn cataloged() -> Engine {
        let mut eng = engine(five_items(), 3);
        eng.apply_negative_properties(&["Z".to_string()]);
        eng.catalog_all(3).unwrap();
        eng
    }

    fn gzip(json: &str) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(json.as_bytes()).unwrap();
        enc.finish().unwrap()
    }

    fn item_keys(engine: &Engine) -> BTreeSet<ItemKey> {
        engine.item_keys().cloned().collect()
    }

    fn property_keys(engine: &Engine) -> BTreeSet<PropertyKey> {
        engine.property_keys().cloned().collect()
    }

    #[test]
    fn test_full_roundtrip_reproduces_maps() {
        let original = cataloged();
        let mut store = InMemoryStore::new();
        store
            .save(&Snapshot::capture(&original, SaveOptions::full()))
            .unwrap();

        let restored = store
            .load()
            .unwrap()
            .unwrap()
            .restore(&LoadOptions::default())
            .unwrap();

        assert_eq!(item_keys(&restored), item_keys(&original));
        assert_eq!(property_keys(&restored), property_keys(&original));
        for pkey in original.property_keys() {
            let a: BTreeSet<ItemKey> = original.recipes_for(pkey).into_iter().collect();
            let b: BTreeSet<ItemKey> = restored.recipes_for(pkey).into_iter().collect();
            assert_eq!(a, b);
        }
        assert_eq!(restored.max_items_per_combination(), 3);
        assert_eq!(restored.property("Z").unwrap().status, -1);
        assert_eq!(restored.property("X").unwrap().status, 1);
    }

    #[test]
    fn test_recipes_are_sorted() {
        let snapshot = Snapshot::capture(&cataloged(), SaveOptions::full());
        for recipe in snapshot.recipes.unwrap() {
            let mut sorted = recipe.clone();
            sorted.sort();
            assert_eq!(recipe, sorted);
        }
    }

    #[test]
    fn test_lite_roundtrip_seeds_placeholders() {
        let original = cataloged();
        let snapshot = Snapshot::capture(&original, SaveOptions::lite());
        assert!(snapshot.recipes.is_none());

        let mut restored = snapshot.restore(&LoadOptions::default()).unwrap();
        assert_eq!(restored.recipe_count(), 0);
        assert_eq!(property_keys(&restored), property_keys(&original));

        let target = key(&["X", "Y", "Z"]);
        assert!(restored.combinations_for(&target).is_empty());
        let found = restored.research(&target).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_key(), key(&["A", "B", "C"]));
    }

    #[test]
    fn test_load_options_skip_sections() {
        let snapshot = Snapshot::capture(&cataloged(), SaveOptions::full());
        let options = LoadOptions {
            max_items_override: Some(2),
            load_recipes: false,
            load_potions: false,
        };
        let restored = snapshot.restore(&options).unwrap();
        assert_eq!(restored.recipe_count(), 0);
        assert_eq!(restored.property_key_count(), 0);
        assert_eq!(restored.max_items_per_combination(), 2);
    }

    #[test]
    fn test_reveal_level_is_restored() {
        let mut eng = engine(five_items(), 3);
        eng.set_reveal_level(1).unwrap();
        let restored = Snapshot::capture(&eng, SaveOptions::full())
            .restore(&LoadOptions::default())
            .unwrap();
        assert_eq!(restored.catalog().mastery(), Mastery::Apprentice);
    }

    #[test]
    fn test_missing_max_items_is_malformed() {
        let json = r#"{"version": "1.0", "items": []}"#;
        let snapshot = decode(gzip(json).as_slice()).unwrap();
        assert!(matches!(
            snapshot.clone().restore(&LoadOptions::default()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));

        let options = LoadOptions {
            max_items_override: Some(3),
            ..LoadOptions::default()
        };
        assert!(snapshot.restore(&options).is_ok());
    }

    #[test]
    fn test_non_integer_max_items_is_malformed() {
        let json = r#"{"version": "1.0", "maxItemsPerCombination": "three", "items": []}"#;
        assert!(matches!(
            decode(gzip(json).as_slice()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
        let json = r#"{"version": "1.0", "maxItemsPerCombination": 2.5, "items": []}"#;
        assert!(matches!(
            decode(gzip(json).as_slice()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let json = r#"{"maxItemsPerCombination": 3, "items": []}"#;
        assert!(matches!(
            decode(gzip(json).as_slice()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_not_gzip_is_malformed() {
        let bytes = b"{\"version\": \"1.0\"}".to_vec();
        assert!(matches!(
            decode(bytes.as_slice()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_unknown_recipe_item_is_malformed() {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            max_items_per_combination: Some(3),
            reveal_level: Mastery::Expert,
            items: vec![record("A", &["X"]), record("B", &["X"])],
            properties: Vec::new(),
            recipes: Some(vec![vec!["A".to_string(), "Ghost".to_string()]]),
            potions: None,
        };
        assert!(matches!(
            snapshot.restore(&LoadOptions::default()),
            Err(AlchemyError::MalformedSnapshot(msg)) if msg.contains("Ghost")
        ));
    }

    fn with_recipes(recipes: &[&[&str]]) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            max_items_per_combination: Some(3),
            reveal_level: Mastery::Expert,
            items: vec![record("A", &["X"]), record("B", &["X"]), record("C", &["Y"])],
            properties: Vec::new(),
            recipes: Some(
                recipes
                    .iter()
                    .map(|r| r.iter().map(|name| name.to_string()).collect())
                    .collect(),
            ),
            potions: None,
        }
    }

    #[test]
    fn test_recipe_with_repeated_item_is_malformed() {
        assert!(matches!(
            with_recipes(&[&["A", "A"], &["A", "B"]]).restore(&LoadOptions::default()),
            Err(AlchemyError::MalformedSnapshot(msg)) if msg.contains("A + A")
        ));
        // Whitespace variants collapse to the same item
        assert!(matches!(
            with_recipes(&[&["B", " B "]]).restore(&LoadOptions::default()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_invalid_recipe_is_malformed() {
        assert!(matches!(
            with_recipes(&[&["A", "C"]]).restore(&LoadOptions::default()),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
        let restored = with_recipes(&[&["A", "B"]])
            .restore(&LoadOptions::default())
            .unwrap();
        assert_eq!(
            item_keys(&restored),
            [key(&["A", "B"])].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(
            property_keys(&restored),
            [key(&["X"])].into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_small_bound_rejected_on_restore() {
        let mut snapshot = Snapshot::capture(&cataloged(), SaveOptions::lite());
        snapshot.max_items_per_combination = Some(1);
        assert!(matches!(
            snapshot.restore(&LoadOptions::default()),
            Err(AlchemyError::InvalidCombinationSize(1))
        ));
    }

    #[test]
    fn test_encoded_snapshot_is_gzip() {
        let mut buf = Vec::new();
        encode(&mut buf, &Snapshot::capture(&cataloged(), SaveOptions::full())).unwrap();
        assert_eq!(buf[0], 0x1f);
        assert_eq!(buf[1], 0x8b);
    }
}
