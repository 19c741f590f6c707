use crate::combination::Combination;
use crate::commands::ListedRecipe;
use crate::engine::Engine;
use crate::error::{AlchemyError, Result};
use crate::model::{ItemKey, PropertyKey};
use crate::selector::{resolve, ItemRef};

/// Property names in listing order.
pub fn property_names(engine: &Engine) -> Vec<String> {
    let mut names: Vec<String> = engine.properties().map(|p| p.name.clone()).collect();
    names.sort();
    names
}

pub fn resolve_items(engine: &Engine, refs: &[ItemRef]) -> Result<ItemKey> {
    if refs.is_empty() {
        return Err(AlchemyError::Api("No items given".to_string()));
    }
    let names = engine.catalog().names();
    Ok(resolve(&names, refs, "item")?.into_iter().collect())
}

pub fn resolve_properties(engine: &Engine, refs: &[ItemRef]) -> Result<PropertyKey> {
    if refs.is_empty() {
        return Err(AlchemyError::Api("No properties given".to_string()));
    }
    let names = property_names(engine);
    Ok(resolve(&names, refs, "property")?.into_iter().collect())
}

pub fn listed_recipes<'a, I>(combinations: I) -> Vec<ListedRecipe>
where
    I: IntoIterator<Item = &'a Combination>,
{
    combinations.into_iter().map(ListedRecipe::from).collect()
}

pub fn join(names: &std::collections::BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(" + ")
}
