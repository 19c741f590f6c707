use crate::commands::helpers::{join, listed_recipes, resolve_properties};
use crate::commands::{CmdMessage, CmdResult};
use crate::engine::Engine;
use crate::error::Result;
use crate::selector::ItemRef;

/// Recipes producing exactly the selected properties.
///
/// With `research` the engine enumerates candidates first; otherwise only
/// what is already known is reported.
pub fn run(engine: &mut Engine, refs: &[ItemRef], research: bool) -> Result<CmdResult> {
    let target = resolve_properties(engine, refs)?;
    let recipes = if research {
        listed_recipes(engine.research(&target)?)
    } else {
        listed_recipes(engine.combinations_for(&target))
    };

    let mut associated: Vec<String> = engine.associated_properties(&target).into_iter().collect();
    associated.sort();

    let mut result = CmdResult::default();
    if recipes.is_empty() {
        if !research && !engine.is_searched(&target) {
            result.add_message(CmdMessage::info(format!(
                "No known recipes for {}; try --research",
                join(&target)
            )));
        } else {
            result.add_message(CmdMessage::warning(format!(
                "No recipes make exactly {}",
                join(&target)
            )));
        }
    }
    Ok(result.with_recipes(recipes).with_associated(associated))
}

/// Known recipes whose result includes all selected properties.
pub fn containing(engine: &Engine, refs: &[ItemRef]) -> Result<CmdResult> {
    let properties = resolve_properties(engine, refs)?;
    let recipes = listed_recipes(
        engine
            .combinations_containing_properties(&properties)
            .into_iter()
            .flat_map(|(_, combinations)| combinations),
    );

    let mut result = CmdResult::default();
    if recipes.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "No known recipes include {}",
            join(&properties)
        )));
    }
    Ok(result.with_recipes(recipes))
}
