use crate::combination::Combination;
use crate::commands::helpers::resolve_items;
use crate::commands::{CmdMessage, CmdResult, ListedItem, ListedRecipe};
use crate::engine::Engine;
use crate::error::{AlchemyError, Result};
use crate::selector::ItemRef;
use std::rc::Rc;

/// Every catalog item, numbered in name order.
pub fn list(engine: &Engine) -> Result<CmdResult> {
    let catalog = engine.catalog();
    let mut listed = Vec::with_capacity(catalog.len());
    for (pos, name) in catalog.names().iter().enumerate() {
        if let Some(item) = catalog.lookup(name) {
            listed.push(ListedItem::new(pos + 1, item));
        }
    }
    Ok(CmdResult::default().with_listed_items(listed))
}

/// Mixes the selected items and reports the result.
///
/// `listed_items` holds the items that would change the result if added,
/// `associated` the items seen alongside the whole selection in known recipes.
pub fn lab(engine: &Engine, refs: &[ItemRef]) -> Result<CmdResult> {
    let selection = resolve_items(engine, refs)?;
    let catalog = engine.catalog();

    let mut combination = Combination::default();
    for name in &selection {
        let item = catalog
            .lookup(name)
            .ok_or_else(|| AlchemyError::Api(format!("Unknown item: {}", name)))?;
        combination.add_item(Rc::clone(item));
    }
    let valid = combination.mix().check();

    let mut result = CmdResult::default();
    if combination.len() < 2 {
        result.add_message(CmdMessage::info("Select at least two items to mix"));
    } else if valid {
        result.add_message(CmdMessage::success(format!("Valid recipe: {}", combination)));
    } else if combination.properties().is_empty() {
        result.add_message(CmdMessage::warning("These items share no properties"));
    } else {
        result.add_message(CmdMessage::warning(format!(
            "Not a minimal recipe: {}",
            combination
        )));
    }

    let additions = catalog
        .names()
        .iter()
        .enumerate()
        .filter_map(|(pos, name)| {
            let item = catalog.lookup(name)?;
            combination
                .extended_with(Rc::clone(item))
                .map(|_| ListedItem::new(pos + 1, item))
        })
        .collect();

    let associated = engine.associated_items(&selection).into_iter().collect();

    let mut recipes = Vec::new();
    if combination.is_mixed() {
        recipes.push(ListedRecipe::from(&combination));
    }
    Ok(result
        .with_recipes(recipes)
        .with_listed_items(additions)
        .with_associated(associated))
}
