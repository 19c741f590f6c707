use crate::engine::{check_combination_size, MIN_COMBINATION_SIZE};
use crate::error::{AlchemyError, Result};
use crate::model::Mastery;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_MAX_ITEMS: usize = 3;
const SNAPSHOT_FILE_EXT: &str = "json.gz";

/// Keys accepted by [`EngineConfig::get`] and [`EngineConfig::set`].
pub const CONFIG_KEYS: [&str; 5] = [
    "items-source",
    "max-items",
    "negative-properties",
    "reveal-level",
    "snapshot",
];

/// Engine configuration, stored as config.json in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// JSON file holding the raw item records
    #[serde(default)]
    pub items_source: Option<PathBuf>,

    /// Largest combination the engine enumerates
    #[serde(default = "default_max_items")]
    pub max_items_per_combination: usize,

    /// Properties flagged with status -1; every other property gets +1
    #[serde(default)]
    pub negative_properties: Vec<String>,

    /// Catalog reveal level applied when building from `items_source`
    #[serde(default)]
    pub reveal_level: Mastery,

    /// Where computed recipes are cached
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            items_source: None,
            max_items_per_combination: DEFAULT_MAX_ITEMS,
            negative_properties: Vec::new(),
            reveal_level: Mastery::default(),
            snapshot: None,
        }
    }
}

/// Built-in settings for the two reference ingredient sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Four-ingredient potions
    Oblivion,
    /// Three-ingredient potions
    Skyrim,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::Oblivion => "oblivion",
            Preset::Skyrim => "skyrim",
        }
    }

    pub fn max_items_per_combination(self) -> usize {
        match self {
            Preset::Oblivion => 4,
            Preset::Skyrim => 3,
        }
    }

    pub fn negative_properties(self) -> &'static [&'static str] {
        match self {
            Preset::Oblivion => &[
                "Burden",
                "Damage Agility",
                "Damage Endurance",
                "Damage Fatigue",
                "Damage Health",
                "Damage Intelligence",
                "Damage Luck",
                "Damage Magicka",
                "Damage Personality",
                "Damage Speed",
                "Damage Strength",
                "Damage Willpower",
                "Drain Fatigue",
                "Drain Health",
                "Drain Intelligence",
                "Drain Magicka",
                "Fire Damage",
                "Frost Damage",
                "Paralyze",
                "Shock Damage",
                "Silence",
                "Weakness to Fire",
            ],
            Preset::Skyrim => &[
                "Damage Health",
                "Damage Magicka",
                "Damage Magicka Regen",
                "Damage Stamina",
                "Damage Stamina Regen",
                "Fear",
                "Frenzy",
                "Lingering Damage Health",
                "Lingering Damage Magicka",
                "Lingering Damage Stamina",
                "Paralysis",
                "Ravage Health",
                "Ravage Magicka",
                "Ravage Stamina",
                "Slow",
                "Weakness to Fire",
                "Weakness to Frost",
                "Weakness to Magic",
                "Weakness to Poison",
                "Weakness to Shock",
            ],
        }
    }

    /// A config for this preset whose files live under `data_dir`.
    pub fn config(self, data_dir: &Path) -> EngineConfig {
        EngineConfig {
            items_source: Some(data_dir.join(format!("{}.items.json", self.name()))),
            max_items_per_combination: self.max_items_per_combination(),
            negative_properties: self
                .negative_properties()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reveal_level: Mastery::Expert,
            snapshot: Some(data_dir.join(format!("{}.{}", self.name(), SNAPSHOT_FILE_EXT))),
        }
    }
}

impl EngineConfig {
    /// Reads `config.json` from `config_dir`. A missing file means defaults.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let path = config_dir.as_ref().join(CONFIG_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(AlchemyError::Io(e)),
        };
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes `config.json`, creating `config_dir` as needed.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let dir = config_dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(dir.join(CONFIG_FILENAME), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        check_combination_size(self.max_items_per_combination)
    }

    /// Snapshot location, falling back to `default.json.gz` under `data_dir`.
    pub fn snapshot_path(&self, data_dir: &Path) -> PathBuf {
        self.snapshot
            .clone()
            .unwrap_or_else(|| data_dir.join(format!("default.{}", SNAPSHOT_FILE_EXT)))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "items-source" => Some(display_path(&self.items_source)),
            "max-items" => Some(self.max_items_per_combination.to_string()),
            "negative-properties" => Some(self.negative_properties.join(", ")),
            "reveal-level" => Some(self.reveal_level.to_string()),
            "snapshot" => Some(display_path(&self.snapshot)),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "items-source" => self.items_source = optional_path(value),
            "max-items" => {
                let n: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("max-items must be a number, got '{}'", value))?;
                if n < MIN_COMBINATION_SIZE {
                    return Err(format!("max-items must be at least {}", MIN_COMBINATION_SIZE));
                }
                self.max_items_per_combination = n;
            }
            "negative-properties" => {
                self.negative_properties = value
                    .split(',')
                    .map(crate::model::normalize_name)
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            "reveal-level" => {
                let level: i64 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("reveal-level must be 0-4, got '{}'", value))?;
                self.reveal_level = Mastery::try_from(level).map_err(|e| e.to_string())?;
            }
            "snapshot" => self.snapshot = optional_path(value),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unset)".to_string())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
