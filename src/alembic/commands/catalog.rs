use crate::catalog::{read_records, ItemCatalog};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::store::{SaveOptions, Snapshot, SnapshotStore};
use std::path::Path;

/// Builds a fresh engine over the item records in `source`.
pub fn engine_from_source(source: &Path, config: &EngineConfig) -> Result<Engine> {
    let records = read_records(source)?;
    let catalog = ItemCatalog::from_records(records, config.reveal_level)?;
    Engine::with_config(catalog, config)
}

/// Recomputes every recipe and saves the result.
pub fn run<S: SnapshotStore>(
    engine: &mut Engine,
    store: &mut S,
    max_items: Option<usize>,
    save: SaveOptions,
) -> Result<CmdResult> {
    if let Some(max_items) = max_items {
        engine.set_max_items_per_combination(max_items)?;
    }
    engine.catalog_everything()?;
    store.save(&Snapshot::capture(engine, save))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Cataloged {} recipes producing {} potions from {} items (up to {} per combination)",
        engine.recipe_count(),
        engine.property_key_count(),
        engine.catalog().len(),
        engine.max_items_per_combination()
    )));
    result.add_message(CmdMessage::info(format!(
        "Snapshot saved to {}",
        store.location()
    )));
    Ok(result)
}
