//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for
//! every alembic operation.
//!
//! The facade:
//! - **Parses references** (`"3"`, `"2-4"`, `"Garlic"`) into [`ItemRef`]s
//! - **Owns the engine**, restoring it from the snapshot store on first use
//!   or building it from the configured item source
//! - **Persists** newly discovered recipes after research
//!
//! It does no printing and never exits. Business logic lives in
//! `commands/*.rs`.
//!
//! `AlchemyApi<S: SnapshotStore>` is generic over where snapshots live:
//! `FileStore` in production, `InMemoryStore` in tests.

use crate::commands;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{AlchemyError, Result};
use crate::selector::{parse_refs, ItemRef};
use crate::store::{LoadOptions, SaveOptions, Snapshot, SnapshotStore};
use std::path::PathBuf;
use tracing::debug;

pub struct AlchemyApi<S: SnapshotStore> {
    store: S,
    config: EngineConfig,
    paths: AlchemyPaths,
    engine: Option<Engine>,
}

impl<S: SnapshotStore> AlchemyApi<S> {
    pub fn new(store: S, config: EngineConfig, paths: AlchemyPaths) -> Self {
        Self {
            store,
            config,
            paths,
            engine: None,
        }
    }

    /// Starts from an already built engine instead of the store.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn paths(&self) -> &AlchemyPaths {
        &self.paths
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Recomputes every recipe, from `items` when given, else from the
    /// configured item source, else over the stored catalog.
    pub fn catalog(
        &mut self,
        items: Option<PathBuf>,
        max_items: Option<usize>,
        lite: bool,
    ) -> Result<CmdResult> {
        let mut engine = match items.or_else(|| self.config.items_source.clone()) {
            Some(source) => commands::catalog::engine_from_source(&source, &self.config)?,
            None => match self.engine.take() {
                Some(engine) => engine,
                None => self.restore()?.ok_or_else(no_source)?,
            },
        };
        let save = if lite {
            SaveOptions::lite()
        } else {
            SaveOptions::full()
        };
        let result = commands::catalog::run(&mut engine, &mut self.store, max_items, save);
        self.engine = Some(engine);
        result
    }

    pub fn recipes<I: AsRef<str>>(&mut self, properties: &[I], research: bool) -> Result<CmdResult> {
        let refs = parse(properties)?;
        self.ensure_engine()?;
        let engine = self.engine.as_mut().ok_or_else(no_source)?;

        let before = engine.stats().accepted;
        let mut result = commands::recipes::run(engine, &refs, research)?;
        let discovered = engine.stats().accepted - before;
        if discovered > 0 {
            self.store
                .save(&Snapshot::capture(engine, SaveOptions::full()))?;
            result.add_message(CmdMessage::info(format!(
                "Saved {} newly discovered recipes",
                discovered
            )));
        }
        Ok(result)
    }

    pub fn recipes_containing<I: AsRef<str>>(&mut self, properties: &[I]) -> Result<CmdResult> {
        let refs = parse(properties)?;
        commands::recipes::containing(self.engine()?, &refs)
    }

    pub fn list_items(&mut self) -> Result<CmdResult> {
        commands::items::list(self.engine()?)
    }

    pub fn item_lab<I: AsRef<str>>(&mut self, items: &[I]) -> Result<CmdResult> {
        let refs = parse(items)?;
        commands::items::lab(self.engine()?, &refs)
    }

    pub fn list_properties(&mut self) -> Result<CmdResult> {
        commands::properties::list(self.engine()?)
    }

    pub fn property_lab<I: AsRef<str>>(&mut self, properties: &[I]) -> Result<CmdResult> {
        let refs = parse(properties)?;
        commands::properties::lab(self.engine()?, &refs)
    }

    pub fn info(&mut self) -> Result<CmdResult> {
        let location = self.store.location();
        commands::info::run(self.engine()?, location)
    }

    pub fn configure(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.paths, action)
    }

    fn engine(&mut self) -> Result<&Engine> {
        self.ensure_engine()?;
        self.engine.as_ref().ok_or_else(no_source)
    }

    fn ensure_engine(&mut self) -> Result<()> {
        if self.engine.is_some() {
            return Ok(());
        }
        let engine = match self.restore()? {
            Some(engine) => engine,
            None => {
                let source = self.config.items_source.clone().ok_or_else(no_source)?;
                debug!(source = %source.display(), "no snapshot, building from item source");
                commands::catalog::engine_from_source(&source, &self.config)?
            }
        };
        self.engine = Some(engine);
        Ok(())
    }

    fn restore(&self) -> Result<Option<Engine>> {
        self.store
            .load()?
            .map(|snapshot| snapshot.restore(&LoadOptions::default()))
            .transpose()
    }
}

fn parse<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<ItemRef>> {
    parse_refs(inputs.iter().map(|s| s.as_ref())).map_err(AlchemyError::Api)
}

fn no_source() -> AlchemyError {
    AlchemyError::Api(
        "No snapshot or item source: run `catalog --items <file>` or set items-source".to_string(),
    )
}

pub use crate::commands::config::ConfigAction;
pub use commands::{
    AlchemyPaths, CmdMessage, CmdResult, EngineInfo, ListedItem, ListedProperty, ListedRecipe,
    MessageLevel,
};
