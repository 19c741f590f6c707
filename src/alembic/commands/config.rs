use crate::commands::{AlchemyPaths, CmdMessage, CmdResult};
use crate::config::{EngineConfig, Preset};
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
    ApplyPreset(Preset),
}

pub fn run(paths: &AlchemyPaths, action: ConfigAction) -> Result<CmdResult> {
    let dir = &paths.config_dir;
    match action {
        ConfigAction::ShowAll => {
            let config = EngineConfig::load(dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = EngineConfig::load(dir)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = EngineConfig::load(dir)?;
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e));
                return Ok(res);
            }
            config.save(dir)?;
            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
        ConfigAction::ApplyPreset(preset) => {
            let config = preset.config(&paths.data_dir);
            config.save(dir)?;
            let mut result = CmdResult::default().with_config(config.clone());
            result.add_message(CmdMessage::success(format!(
                "Applied {} preset: up to {} items per combination, {} negative properties",
                preset.name(),
                config.max_items_per_combination,
                config.negative_properties.len()
            )));
            if let Some(source) = &config.items_source {
                if !source.exists() {
                    result.add_message(CmdMessage::warning(format!(
                        "Item source {} does not exist yet",
                        source.display()
                    )));
                }
            }
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    fn paths(dir: &tempfile::TempDir) -> AlchemyPaths {
        AlchemyPaths {
            config_dir: dir.path().join("config"),
            data_dir: dir.path().join("data"),
        }
    }

    #[test]
    fn set_persists_value() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(&dir);
        let result = run(
            &paths,
            ConfigAction::Set("max-items".into(), "4".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);

        let shown = run(&paths, ConfigAction::ShowKey("max-items".into())).unwrap();
        assert_eq!(shown.messages[0].content, "4");
    }

    #[test]
    fn set_reports_bad_value_without_saving() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(&dir);
        let result = run(
            &paths,
            ConfigAction::Set("reveal-level".into(), "9".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!paths.config_dir.join("config.json").exists());
    }

    #[test]
    fn unknown_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&paths(&dir), ConfigAction::ShowKey("colour".into())).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
    }

    #[test]
    fn preset_writes_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(&dir);
        let result = run(&paths, ConfigAction::ApplyPreset(Preset::Oblivion)).unwrap();
        assert!(result.messages[0].content.contains("oblivion"));
        assert_eq!(result.messages[1].level, MessageLevel::Warning);

        let shown = run(&paths, ConfigAction::ShowAll).unwrap();
        let config = shown.config.unwrap();
        assert_eq!(config.max_items_per_combination, 4);
        assert_eq!(
            config.snapshot,
            Some(paths.data_dir.join("oblivion.json.gz"))
        );
    }
}
