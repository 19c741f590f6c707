use crate::commands::{CmdResult, EngineInfo};
use crate::engine::Engine;
use crate::error::Result;

pub fn run(engine: &Engine, snapshot: String) -> Result<CmdResult> {
    let catalog = engine.catalog();
    let info = EngineInfo {
        items: catalog.len(),
        properties: engine.properties().count(),
        origins: catalog.origins().iter().cloned().collect(),
        recipes: engine.recipe_count(),
        potions: engine.property_key_count(),
        max_items_per_combination: engine.max_items_per_combination(),
        reveal_level: catalog.mastery(),
        stats: engine.stats(),
        snapshot,
    };
    Ok(CmdResult::default().with_info(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mastery;
    use crate::test_utils::{engine, five_items};

    #[test]
    fn summarizes_engine() {
        let mut eng = engine(five_items(), 3);
        eng.catalog_all(3).unwrap();
        let info = run(&eng, "memory".into()).unwrap().info.unwrap();

        assert_eq!(info.items, 5);
        assert_eq!(info.properties, 4);
        assert_eq!(info.origins, vec!["Base"]);
        assert_eq!(info.recipes, 13);
        assert_eq!(info.potions, 7);
        assert_eq!(info.reveal_level, Mastery::Master);
        assert_eq!(info.stats.candidates_evaluated, 20);
        assert_eq!(info.snapshot, "memory");
    }
}
