use crate::commands::helpers::{join, property_names, resolve_properties};
use crate::commands::{CmdMessage, CmdResult, ListedItem, ListedProperty};
use crate::engine::Engine;
use crate::error::Result;
use crate::selector::ItemRef;

pub fn list(engine: &Engine) -> Result<CmdResult> {
    let catalog = engine.catalog();
    let listed = property_names(engine)
        .into_iter()
        .enumerate()
        .filter_map(|(pos, name)| {
            let property = engine.property(&name)?;
            Some(ListedProperty {
                index: pos + 1,
                status: property.status,
                item_count: catalog.items_with_property(&name).len(),
                name,
            })
        })
        .collect();
    Ok(CmdResult::default().with_listed_properties(listed))
}

/// Items carrying any selected property, plus the properties known to
/// combine with all of them.
pub fn lab(engine: &Engine, refs: &[ItemRef]) -> Result<CmdResult> {
    let selection = resolve_properties(engine, refs)?;
    let catalog = engine.catalog();
    let carriers = catalog.items_with_any_property(&selection);

    let items = catalog
        .names()
        .iter()
        .enumerate()
        .filter(|(_, name)| carriers.contains(*name))
        .filter_map(|(pos, name)| catalog.lookup(name).map(|item| ListedItem::new(pos + 1, item)))
        .collect();
    let associated = engine.associated_properties(&selection).into_iter().collect();

    let mut result = CmdResult::default();
    if carriers.len() < 2 {
        result.add_message(CmdMessage::warning(format!(
            "Fewer than two items show {}",
            join(&selection)
        )));
    }
    Ok(result.with_listed_items(items).with_associated(associated))
}
