use alembic::api::{CmdMessage, EngineInfo, ListedItem, ListedProperty, ListedRecipe, MessageLevel};
use alembic::combination::Validity;
use alembic::config::{EngineConfig, CONFIG_KEYS};
use colored::Colorize;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_items(items: &[ListedItem]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }
    let width = index_width(items.iter().map(|i| i.index));
    for item in items {
        println!(
            "{:>width$}. {}  {}",
            item.index,
            item.name.bold(),
            item.properties.join(", ").dimmed(),
            width = width
        );
    }
}

pub(super) fn print_properties(properties: &[ListedProperty]) {
    if properties.is_empty() {
        println!("No properties found.");
        return;
    }
    let width = index_width(properties.iter().map(|p| p.index));
    for property in properties {
        let name = match property.status {
            s if s < 0 => property.name.red(),
            s if s > 0 => property.name.green(),
            _ => property.name.normal(),
        };
        println!(
            "{:>width$}. {}  {}",
            property.index,
            name,
            format!("({} items)", property.item_count).dimmed(),
            width = width
        );
    }
}

pub(super) fn print_recipes(recipes: &[ListedRecipe]) {
    for recipe in recipes {
        let result = if recipe.properties.is_empty() {
            "None".to_string()
        } else {
            recipe.properties.join(" + ")
        };
        let marker = match recipe.validity {
            Validity::Invalid => "✗".red(),
            Validity::Valid => "✓".green(),
            Validity::Unevaluated => " ".normal(),
        };
        let value = recipe
            .value
            .map(|v| format!("  value {}", v))
            .unwrap_or_default();
        println!(
            "{} {} = {}{}",
            marker,
            recipe.items.join(" + ").bold(),
            result,
            value.dimmed()
        );
    }
}

pub(super) fn print_info(info: &EngineInfo) {
    println!("items       {}", info.items);
    println!("properties  {}", info.properties);
    println!("origins     {}", info.origins.join(", "));
    println!("recipes     {}", info.recipes);
    println!("potions     {}", info.potions);
    println!("max items   {}", info.max_items_per_combination);
    println!("reveal      {}", info.reveal_level);
    println!("snapshot    {}", info.snapshot.dimmed());
    if info.stats.candidates_evaluated > 0 {
        println!(
            "{}",
            format!(
                "evaluated {} candidates this session ({} research hits, {} misses)",
                info.stats.candidates_evaluated,
                info.stats.research_hits,
                info.stats.research_misses
            )
            .dimmed()
        );
    }
}

pub(super) fn print_config(config: &EngineConfig) {
    for key in CONFIG_KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

fn index_width(indexes: impl Iterator<Item = usize>) -> usize {
    indexes.max().unwrap_or(0).to_string().len()
}
