//! Fixtures shared by unit tests across modules.

use crate::catalog::ItemCatalog;
use crate::engine::Engine;
use crate::model::{ItemRecord, Mastery};
use std::collections::BTreeSet;

pub fn record(name: &str, props: &[&str]) -> ItemRecord {
    let mut slots: [Option<String>; 4] = Default::default();
    for (slot, p) in slots.iter_mut().zip(props) {
        *slot = Some(p.to_string());
    }
    let [slot0, slot1, slot2, slot3] = slots;
    ItemRecord {
        origin: "Base".to_string(),
        name: name.to_string(),
        external_id: format!("id-{}", name.to_lowercase()),
        weight: 0.5,
        value: 2,
        slot0,
        slot1,
        slot2,
        slot3,
    }
}

/// A fully revealed catalog built from `(name, properties)` pairs.
pub fn catalog(items: &[(&str, &[&str])]) -> ItemCatalog {
    ItemCatalog::from_records(
        items.iter().map(|(name, props)| record(name, props)),
        Mastery::Master,
    )
    .unwrap()
}

/// Five items: the X/Y/Z triangle plus two single-purpose extras.
pub fn five_items() -> ItemCatalog {
    catalog(&[
        ("A", &["X", "Y"]),
        ("B", &["X", "Z"]),
        ("C", &["Y", "Z"]),
        ("D", &["X"]),
        ("E", &["W", "Y"]),
    ])
}

pub fn engine(catalog: ItemCatalog, max_items: usize) -> Engine {
    Engine::new(catalog, max_items).unwrap()
}

pub fn key(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}
