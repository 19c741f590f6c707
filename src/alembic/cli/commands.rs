use super::print::{print_config, print_info, print_items, print_messages, print_properties, print_recipes};
use super::setup::{setup_tracing, Cli, Commands, HOME_ENV};
use alembic::api::{AlchemyApi, AlchemyPaths, ConfigAction};
use alembic::config::EngineConfig;
use alembic::error::{AlchemyError, Result};
use alembic::store::fs::FileStore;
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;

struct AppContext {
    api: AlchemyApi<FileStore>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Catalog { items, max, lite }) => handle_catalog(&mut ctx, items, max, lite),
        Some(Commands::Recipes {
            properties,
            research,
            containing,
        }) => handle_recipes(&mut ctx, properties, research, containing),
        Some(Commands::Items { items }) => handle_items(&mut ctx, items),
        Some(Commands::Properties { properties }) => handle_properties(&mut ctx, properties),
        Some(Commands::Info) | None => handle_info(&mut ctx),
        Some(Commands::Config { key, value, preset }) => {
            let action = match (preset, key, value) {
                (Some(preset), _, _) => ConfigAction::ApplyPreset(preset),
                (None, None, _) => ConfigAction::ShowAll,
                (None, Some(key), None) => ConfigAction::ShowKey(key),
                (None, Some(key), Some(value)) => ConfigAction::Set(key, value),
            };
            handle_config(&ctx, action)
        }
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let paths = resolve_paths(cli)?;
    let config = EngineConfig::load(&paths.config_dir)?;
    let snapshot = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| config.snapshot_path(&paths.data_dir));

    let store = FileStore::new(snapshot);
    let api = AlchemyApi::new(store, config, paths);
    Ok(AppContext { api })
}

/// `--config` wins, then `ALEMBIC_HOME`, then the platform directories.
fn resolve_paths(cli: &Cli) -> Result<AlchemyPaths> {
    let home = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(HOME_ENV).map(PathBuf::from));
    if let Some(dir) = home {
        return Ok(AlchemyPaths {
            config_dir: dir.clone(),
            data_dir: dir,
        });
    }

    let dirs = ProjectDirs::from("com", "alembic", "alembic").ok_or_else(|| {
        AlchemyError::Store("Could not determine a home directory".to_string())
    })?;
    Ok(AlchemyPaths {
        config_dir: dirs.config_dir().to_path_buf(),
        data_dir: dirs.data_dir().to_path_buf(),
    })
}

fn handle_catalog(
    ctx: &mut AppContext,
    items: Option<PathBuf>,
    max: Option<usize>,
    lite: bool,
) -> Result<()> {
    let result = ctx.api.catalog(items, max, lite)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_recipes(
    ctx: &mut AppContext,
    properties: Vec<String>,
    research: bool,
    containing: bool,
) -> Result<()> {
    let result = if containing {
        ctx.api.recipes_containing(&properties)?
    } else {
        ctx.api.recipes(&properties, research)?
    };
    print_recipes(&result.recipes);
    if !result.associated.is_empty() {
        println!();
        println!("Also combines with: {}", result.associated.join(", "));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_items(ctx: &mut AppContext, items: Vec<String>) -> Result<()> {
    if items.is_empty() {
        let result = ctx.api.list_items()?;
        print_items(&result.listed_items);
        print_messages(&result.messages);
        return Ok(());
    }

    let result = ctx.api.item_lab(&items)?;
    print_messages(&result.messages);
    print_recipes(&result.recipes);
    if !result.listed_items.is_empty() {
        println!();
        println!("Adding one of these changes the result:");
        print_items(&result.listed_items);
    }
    if !result.associated.is_empty() {
        println!();
        println!("Seen together in known recipes: {}", result.associated.join(", "));
    }
    Ok(())
}

fn handle_properties(ctx: &mut AppContext, properties: Vec<String>) -> Result<()> {
    if properties.is_empty() {
        let result = ctx.api.list_properties()?;
        print_properties(&result.listed_properties);
        print_messages(&result.messages);
        return Ok(());
    }

    let result = ctx.api.property_lab(&properties)?;
    print_items(&result.listed_items);
    if !result.associated.is_empty() {
        println!();
        println!("Also combines with: {}", result.associated.join(", "));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_info(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.info()?;
    if let Some(info) = &result.info {
        print_info(info);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, action: ConfigAction) -> Result<()> {
    let result = ctx.api.configure(action)?;
    if let Some(config) = &result.config {
        print_config(config);
    }
    print_messages(&result.messages);
    Ok(())
}
