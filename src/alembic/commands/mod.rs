use crate::combination::{Combination, Validity};
use crate::config::EngineConfig;
use crate::engine::EngineStats;
use crate::model::{Item, Mastery};
use std::path::PathBuf;

pub mod catalog;
pub mod config;
pub mod helpers;
pub mod info;
pub mod items;
pub mod properties;
pub mod recipes;

/// Where configuration and data files live.
#[derive(Debug, Clone)]
pub struct AlchemyPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// An item as shown in listings, numbered from 1 in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedItem {
    pub index: usize,
    pub name: String,
    pub origin: String,
    pub properties: Vec<String>,
    pub weight: f64,
    pub value: u64,
}

impl ListedItem {
    pub fn new(index: usize, item: &Item) -> Self {
        Self {
            index,
            name: item.name().to_string(),
            origin: item.origin().to_string(),
            properties: item.visible_properties().iter().cloned().collect(),
            weight: item.weight(),
            value: item.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedProperty {
    pub index: usize,
    pub name: String,
    pub status: i32,
    /// Items showing this property at the current reveal level
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListedRecipe {
    pub items: Vec<String>,
    pub properties: Vec<String>,
    pub validity: Validity,
    pub value: Option<u64>,
    pub weight: Option<f64>,
}

impl From<&Combination> for ListedRecipe {
    fn from(combination: &Combination) -> Self {
        Self {
            items: combination.items().map(|i| i.name().to_string()).collect(),
            properties: combination.properties().iter().cloned().collect(),
            validity: combination.validity(),
            value: combination.value(),
            weight: combination.weight(),
        }
    }
}

/// Counts describing the engine's current state.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineInfo {
    pub items: usize,
    pub properties: usize,
    pub origins: Vec<String>,
    pub recipes: usize,
    pub potions: usize,
    pub max_items_per_combination: usize,
    pub reveal_level: Mastery,
    pub stats: EngineStats,
    pub snapshot: String,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub listed_items: Vec<ListedItem>,
    pub listed_properties: Vec<ListedProperty>,
    pub recipes: Vec<ListedRecipe>,
    /// Names related to the selection, without the selection itself
    pub associated: Vec<String>,
    pub info: Option<EngineInfo>,
    pub config: Option<EngineConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_items(mut self, items: Vec<ListedItem>) -> Self {
        self.listed_items = items;
        self
    }

    pub fn with_listed_properties(mut self, properties: Vec<ListedProperty>) -> Self {
        self.listed_properties = properties;
        self
    }

    pub fn with_recipes(mut self, recipes: Vec<ListedRecipe>) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn with_associated(mut self, names: Vec<String>) -> Self {
        self.associated = names;
        self
    }

    pub fn with_info(mut self, info: EngineInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }
}
