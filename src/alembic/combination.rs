//! # Combinations
//!
//! A [`Combination`] is a duplicate-free set of items evaluated together.
//!
//! ## Mixing
//!
//! A property ends up in the mixed result iff it is visible on at least two
//! of the combination's items. This is the union of all pairwise
//! intersections, computed here by counting occurrences.
//!
//! ## Validity
//!
//! [`Combination::check`] decides whether a mixed combination is a minimal
//! recipe. The result is cached in [`Validity`] until the combination changes
//! or is explicitly reset:
//!
//! 1. Unmixed combinations are invalid.
//! 2. An empty result is invalid.
//! 3. Two items with a non-empty result are always valid.
//! 4. A single-property result from more than two items is invalid.
//! 5. Otherwise the combination is valid iff no subset obtained by dropping
//!    exactly one item yields the same result (see [`Combination::has_excess`]).
//!    Only that one level down is examined.

use crate::model::{Item, ItemKey, PropertySet};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// Memoized outcome of [`Combination::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Unevaluated,
    Valid,
    Invalid,
}

impl Validity {
    fn from_bool(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

/// Union of pairwise intersections: every property present in two or more sets.
pub fn shared_properties<'a, I>(sets: I) -> PropertySet
where
    I: IntoIterator<Item = &'a PropertySet>,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for set in sets {
        for property in set {
            *counts.entry(property.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n >= 2)
        .map(|(p, _)| p.to_string())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Combination {
    items: BTreeMap<String, Rc<Item>>,
    properties: PropertySet,
    mixed: bool,
    validity: Validity,
    value: OnceCell<u64>,
    weight: OnceCell<f64>,
}

impl Combination {
    /// Builds an unmixed combination. Items sharing a name collapse into one.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Rc<Item>>,
    {
        let mut combination = Self::default();
        for item in items {
            combination.add_item(item);
        }
        combination
    }

    /// Mixes and checks `items`, keeping the combination only when valid.
    pub fn valid_from<I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = Rc<Item>>,
    {
        let mut combination = Self::new(items);
        combination.mix();
        combination.check().then_some(combination)
    }

    /// Adds an item; re-adding a present name is a no-op.
    pub fn add_item(&mut self, item: Rc<Item>) -> &mut Self {
        if !self.items.contains_key(item.name()) {
            self.items.insert(item.name().to_string(), item);
            self.reset();
        }
        self
    }

    pub fn remove_item(&mut self, name: &str) -> Option<Rc<Item>> {
        let removed = self.items.remove(name);
        if removed.is_some() {
            self.reset();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.reset();
    }

    /// Drops all derived state, keeping the items.
    pub fn reset(&mut self) -> &mut Self {
        self.properties.clear();
        self.mixed = false;
        self.validity = Validity::Unevaluated;
        self.value = OnceCell::new();
        self.weight = OnceCell::new();
        self
    }

    /// Computes the combined property set. Needs at least two items;
    /// otherwise the combination is left as it was.
    pub fn mix(&mut self) -> &mut Self {
        if self.items.len() >= 2 {
            self.properties = shared_properties(self.items.values().map(|i| i.visible_properties()));
            self.mixed = true;
            self.validity = Validity::Unevaluated;
        }
        self
    }

    /// Whether this is a minimal recipe. Evaluated once per mix.
    pub fn check(&mut self) -> bool {
        if !self.mixed {
            return false;
        }
        if self.validity == Validity::Unevaluated {
            let valid = if self.properties.is_empty() {
                false
            } else if self.items.len() == 2 {
                true
            } else if self.properties.len() == 1 {
                false
            } else {
                !self.has_excess()
            };
            self.validity = Validity::from_bool(valid);
        }
        self.validity == Validity::Valid
    }

    /// True when dropping a single item still reproduces the same result.
    pub fn has_excess(&self) -> bool {
        if self.items.len() < 3 {
            return false;
        }
        self.items.keys().any(|dropped| {
            let rest = self
                .items
                .iter()
                .filter(|(name, _)| *name != dropped)
                .map(|(_, item)| item.visible_properties());
            shared_properties(rest) == self.properties
        })
    }

    /// A mixed copy with `item` added, or `None` when the item is already
    /// present or would not change the result.
    pub fn extended_with(&self, item: Rc<Item>) -> Option<Combination> {
        if self.items.contains_key(item.name()) {
            return None;
        }
        let properties = shared_properties(
            self.items
                .values()
                .map(|i| i.visible_properties())
                .chain(std::iter::once(item.visible_properties())),
        );
        if properties == self.properties {
            return None;
        }
        let mut extended = Combination::new(self.items.values().cloned());
        extended.add_item(item);
        extended.properties = properties;
        extended.mixed = true;
        Some(extended)
    }

    pub fn item_key(&self) -> ItemKey {
        self.items.keys().cloned().collect()
    }

    /// Derived property set; empty until mixed.
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn items(&self) -> impl Iterator<Item = &Rc<Item>> {
        self.items.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_mixed(&self) -> bool {
        self.mixed
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Sum of item values; `None` before mixing.
    pub fn value(&self) -> Option<u64> {
        self.mixed
            .then(|| *self.value.get_or_init(|| self.items.values().map(|i| i.value()).sum()))
    }

    /// Sum of item weights; `None` before mixing.
    pub fn weight(&self) -> Option<f64> {
        self.mixed
            .then(|| *self.weight.get_or_init(|| self.items.values().map(|i| i.weight()).sum()))
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.items.keys().map(String::as_str).collect();
        write!(f, "{}", names.join(" + "))?;
        if !self.mixed {
            return Ok(());
        }
        if self.properties.is_empty() {
            write!(f, " = None")
        } else {
            let props: Vec<&str> = self.properties.iter().map(String::as_str).collect();
            write!(f, " = {}", props.join(" + "))
        }
    }
}
