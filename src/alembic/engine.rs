//! # Combination Index
//!
//! The [`Engine`] owns the catalog and two canonical maps that must always
//! agree with each other:
//!
//! - **by item key**: item-name set → the single canonical combination for
//!   that exact set. The first combination discovered wins; later ones with
//!   the same key are ignored.
//! - **by property key**: property set → item keys of every canonical
//!   combination producing exactly that set, in discovery order. An empty list
//!   is a placeholder: the property set is known to be reachable but its
//!   recipes have not been computed yet.
//!
//! Every entry of the first map is listed exactly once under its own property
//! set in the second, and every listed key resolves in the first.
//!
//! ## Two ways to fill the maps
//!
//! [`Engine::catalog_all`] enumerates every subset of the catalog up to a
//! size bound. It is combinatorial in catalog size and meant to be persisted.
//!
//! [`Engine::research_for_properties`] only enumerates items that carry at
//! least one of the requested properties, and remembers which property sets
//! were already researched. Any valid combination found along the way is
//! accepted under its own property set, not only those matching the target.
//!
//! For a researched target both paths yield the same recipes: an item of a
//! minimal combination that carried none of the target properties could be
//! dropped without changing the result.

use crate::catalog::ItemCatalog;
use crate::combination::Combination;
use crate::config::EngineConfig;
use crate::error::{AlchemyError, Result};
use crate::model::{fold_name, Item, ItemKey, Property, PropertyKey, PropertySet};
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;
use tracing::{debug, info, info_span};

/// Smallest number of items a combination can hold.
pub const MIN_COMBINATION_SIZE: usize = 2;

/// Counters describing enumeration work done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Candidate combinations mixed and checked.
    pub candidates_evaluated: u64,
    /// Combinations that made it into the canonical maps.
    pub accepted: u64,
    /// Research calls answered from the memo.
    pub research_hits: u64,
    /// Research calls that enumerated candidates.
    pub research_misses: u64,
}

pub struct Engine {
    catalog: ItemCatalog,
    properties: IndexMap<String, Property>,
    by_item_key: IndexMap<ItemKey, Combination>,
    by_property_key: IndexMap<PropertyKey, Vec<ItemKey>>,
    searched: HashSet<PropertyKey>,
    max_items: usize,
    stats: EngineStats,
}

pub(crate) fn check_combination_size(max_items: usize) -> Result<()> {
    if max_items < MIN_COMBINATION_SIZE {
        return Err(AlchemyError::InvalidCombinationSize(max_items));
    }
    Ok(())
}

impl Engine {
    pub fn new(catalog: ItemCatalog, max_items: usize) -> Result<Self> {
        check_combination_size(max_items)?;
        let mut engine = Self {
            catalog,
            properties: IndexMap::new(),
            by_item_key: IndexMap::new(),
            by_property_key: IndexMap::new(),
            searched: HashSet::new(),
            max_items,
            stats: EngineStats::default(),
        };
        engine.register_catalog_properties();
        Ok(engine)
    }

    /// Builds an engine over `catalog` using the bound and property polarity
    /// from `config`. The catalog keeps its own reveal level.
    pub fn with_config(catalog: ItemCatalog, config: &EngineConfig) -> Result<Self> {
        let mut engine = Self::new(catalog, config.max_items_per_combination)?;
        if !config.negative_properties.is_empty() {
            engine.apply_negative_properties(&config.negative_properties);
        }
        Ok(engine)
    }

    fn register_catalog_properties(&mut self) {
        for name in self.catalog.all_properties() {
            self.properties
                .entry(name.clone())
                .or_insert_with(|| Property::new(&name));
        }
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn max_items_per_combination(&self) -> usize {
        self.max_items
    }

    pub fn set_max_items_per_combination(&mut self, max_items: usize) -> Result<()> {
        check_combination_size(max_items)?;
        self.max_items = max_items;
        Ok(())
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Adds an item to the catalog. Existing recipes stay valid. Researched
    /// targets sharing a property with the new item are forgotten, so the next
    /// research for them includes it.
    pub fn add_item(&mut self, item: Item) -> Result<()> {
        let name = item.name().to_string();
        self.catalog.add(item)?;
        let added = self
            .catalog
            .lookup(&name)
            .map(|item| item.visible_properties().clone())
            .unwrap_or_default();
        let before = self.searched.len();
        self.searched.retain(|target| target.is_disjoint(&added));
        debug!(
            item = %name,
            forgotten = before - self.searched.len(),
            "item added"
        );
        self.register_catalog_properties();
        Ok(())
    }

    /// Changes the catalog reveal level. Every derived map depends on which
    /// properties are visible, so all of them are cleared.
    pub fn set_reveal_level(&mut self, level: i64) -> Result<()> {
        self.catalog.set_reveal_level(level)?;
        self.clear();
        self.register_catalog_properties();
        Ok(())
    }

    fn clear(&mut self) {
        self.by_item_key.clear();
        self.by_property_key.clear();
        self.searched.clear();
    }

    // --- Properties ---

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Looks a property up by name, ignoring case.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.catalog
            .canonical_property(name)
            .and_then(|canonical| self.properties.get(canonical))
            .or_else(|| self.properties.get(name))
    }

    /// Inserts or replaces a property table entry, under the catalog's
    /// spelling when the catalog knows the name.
    pub fn register_property(&mut self, mut property: Property) {
        if let Some(canonical) = self.catalog.canonical_property(&property.name) {
            property.name = canonical.to_string();
        }
        self.properties.insert(property.name.clone(), property);
    }

    /// Sets `status` on every listed property, or on every unlisted one when
    /// `inverted` is true.
    pub fn set_property_status<'a, I>(&mut self, names: I, status: i32, inverted: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let listed: HashSet<String> = names.into_iter().map(fold_name).collect();
        for property in self.properties.values_mut() {
            if listed.contains(&fold_name(&property.name)) != inverted {
                property.status = status;
            }
        }
    }

    /// Marks `negatives` with status -1 and every other property with +1.
    pub fn apply_negative_properties(&mut self, negatives: &[String]) {
        let names = || negatives.iter().map(String::as_str);
        self.set_property_status(names(), -1, false);
        self.set_property_status(names(), 1, true);
    }

    // --- Canonical maps ---

    /// Inserts a combination unless its item key is already known.
    /// Returns whether it was inserted.
    pub fn accept(&mut self, combination: Combination) -> bool {
        let item_key = combination.item_key();
        if self.by_item_key.contains_key(&item_key) {
            return false;
        }
        self.by_property_key
            .entry(combination.properties().clone())
            .or_default()
            .push(item_key.clone());
        self.by_item_key.insert(item_key, combination);
        self.stats.accepted += 1;
        true
    }

    /// Records `key` as reachable without computing its recipes.
    /// Returns false when the key was already present.
    pub fn seed_property_key(&mut self, key: PropertyKey) -> bool {
        if self.by_property_key.contains_key(&key) {
            return false;
        }
        self.by_property_key.insert(key, Vec::new());
        true
    }

    /// Recomputes every combination of 2..=`max_items` catalog items from
    /// scratch. Returns the number of combinations accepted.
    pub fn catalog_all(&mut self, max_items: usize) -> Result<usize> {
        check_combination_size(max_items)?;
        let _span = info_span!("catalog_all", max_items, items = self.catalog.len()).entered();
        self.clear();
        let pool: Vec<Rc<Item>> = self.catalog.items().to_vec();
        let accepted = self.enumerate(&pool, max_items, false);
        info!(
            accepted,
            recipes = self.by_item_key.len(),
            potions = self.by_property_key.len(),
            "catalog complete"
        );
        Ok(accepted)
    }

    /// Catalogs with the engine's configured bound.
    pub fn catalog_everything(&mut self) -> Result<usize> {
        self.catalog_all(self.max_items)
    }

    /// Enumerates combinations of items carrying any of `target`'s
    /// properties, then returns the recipes producing exactly `target`.
    /// Target names match the catalog's properties case-insensitively.
    ///
    /// Repeated calls with the same target do no further enumeration.
    pub fn research_for_properties(
        &mut self,
        target: &PropertyKey,
        max_items: usize,
    ) -> Result<Vec<&Combination>> {
        check_combination_size(max_items)?;
        let target = &self.catalog.canonical_key(target);
        if self.searched.contains(target) {
            self.stats.research_hits += 1;
            debug!(properties = ?target, "research memo hit");
        } else {
            self.stats.research_misses += 1;
            let candidates = self.catalog.items_with_any_property(target);
            let pool: Vec<Rc<Item>> = self
                .catalog
                .items()
                .iter()
                .filter(|item| candidates.contains(item.name()))
                .cloned()
                .collect();
            let bound = max_items.min(pool.len());
            let accepted = self.enumerate(&pool, bound, true);
            debug!(
                properties = ?target,
                candidates = pool.len(),
                accepted,
                "researched property set"
            );
            self.searched.insert(target.clone());
        }
        Ok(self.combinations_for(target))
    }

    /// Researches with the engine's configured bound.
    pub fn research(&mut self, target: &PropertyKey) -> Result<Vec<&Combination>> {
        self.research_for_properties(target, self.max_items)
    }

    fn enumerate(&mut self, pool: &[Rc<Item>], max_items: usize, skip_known: bool) -> usize {
        let mut accepted = 0;
        for size in MIN_COMBINATION_SIZE..=max_items {
            for members in pool.iter().cloned().combinations(size) {
                if skip_known {
                    let key: ItemKey = members.iter().map(|i| i.name().to_string()).collect();
                    if self.by_item_key.contains_key(&key) {
                        continue;
                    }
                }
                self.stats.candidates_evaluated += 1;
                if let Some(combination) = Combination::valid_from(members) {
                    if self.accept(combination) {
                        accepted += 1;
                    }
                }
            }
        }
        accepted
    }

    pub fn is_searched(&self, target: &PropertyKey) -> bool {
        self.searched.contains(target)
    }

    // --- Queries ---

    /// The canonical combination with exactly these items.
    pub fn combination(&self, item_key: &ItemKey) -> Option<&Combination> {
        self.by_item_key.get(item_key)
    }

    /// Combinations currently indexed under `target`, without researching.
    pub fn combinations_for(&self, target: &PropertyKey) -> Vec<&Combination> {
        self.by_property_key
            .get(target)
            .map(|keys| keys.iter().filter_map(|k| self.by_item_key.get(k)).collect())
            .unwrap_or_default()
    }

    /// Item keys currently indexed under `target`, without researching.
    pub fn recipes_for(&self, target: &PropertyKey) -> Vec<ItemKey> {
        self.by_property_key.get(target).cloned().unwrap_or_default()
    }

    pub fn item_keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.by_item_key.keys()
    }

    pub fn property_keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.by_property_key.keys()
    }

    pub fn recipe_count(&self) -> usize {
        self.by_item_key.len()
    }

    pub fn property_key_count(&self) -> usize {
        self.by_property_key.len()
    }

    /// Other properties that appear alongside all of `subset` in some known
    /// property key.
    pub fn associated_properties(&self, subset: &PropertySet) -> PropertySet {
        associated(self.by_property_key.keys(), subset)
    }

    /// Other items that appear alongside all of `subset` in some known recipe.
    pub fn associated_items(&self, subset: &ItemKey) -> ItemKey {
        associated(self.by_item_key.keys(), subset)
    }

    pub fn combinations_containing_items(&self, items: &ItemKey) -> Vec<&Combination> {
        self.by_item_key
            .iter()
            .filter(|(key, _)| items.is_subset(key))
            .map(|(_, combination)| combination)
            .collect()
    }

    /// Property keys containing all of `properties`, with their combinations.
    pub fn combinations_containing_properties(
        &self,
        properties: &PropertySet,
    ) -> Vec<(&PropertyKey, Vec<&Combination>)> {
        self.by_property_key
            .keys()
            .filter(|key| properties.is_subset(key))
            .map(|key| (key, self.combinations_for(key)))
            .collect()
    }
}

fn associated<'a, I>(keys: I, subset: &BTreeSet<String>) -> BTreeSet<String>
where
    I: Iterator<Item = &'a BTreeSet<String>>,
{
    keys.filter(|key| subset.is_subset(key))
        .flat_map(|key| key.iter())
        .filter(|name| !subset.contains(*name))
        .cloned()
        .collect()
}
