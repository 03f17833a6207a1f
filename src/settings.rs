//! Settings persistence using TOML
//!
//! Stored in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::error::SettingsError;
use crate::game::GameConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Board and timing constants
    pub game: GameConfig,
    /// Visual settings
    pub visual: VisualSettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_down: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub force_next: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if keys.len() == 1 {
        serializer.serialize_str(&keys[0])
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string(), "a".to_string()],
            move_right: vec!["Right".to_string(), "d".to_string()],
            move_down: vec!["Down".to_string(), "s".to_string()],
            rotate: vec!["Up".to_string(), "w".to_string()],
            force_next: vec!["n".to_string()],
            restart: vec!["r".to_string()],
            quit: vec!["q".to_string(), "Esc".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            block_style: "solid".to_string(),
        }
    }
}

impl VisualSettings {
    /// Get the block characters (filled, border) for the configured style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", "<>"),
            "round" => ("()", "##"),
            _ => ("██", "▓▓"), // "solid" or default
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Parse settings, replacing an invalid game section with defaults
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut settings: Settings = toml::from_str(contents)?;
        if let Err(e) = settings.game.validate() {
            warn!("Invalid game settings ({}), using defaults", e);
            settings.game = GameConfig::default();
        }
        Ok(settings)
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("No config directory, using default settings");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Could not parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                // First run: write the defaults out so they can be edited
                let settings = Self::default();
                if let Err(e) = settings.save() {
                    warn!("Could not write default settings: {}", e);
                }
                settings
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), SettingsError> {
        let dir = Self::config_dir().ok_or(SettingsError::NoConfigDir)?;
        let path = dir.join("settings.toml");

        fs::create_dir_all(&dir)?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut settings = Settings::default();
        settings.game.seed = Some(77);
        settings.keys.rotate = vec!["x".to_string()];
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }

    #[test]
    fn test_single_key_or_list() {
        let text = r#"
            [keys]
            rotate = "x"
            quit = ["q", "Esc"]
        "#;
        let settings = Settings::from_toml(text).unwrap();
        assert_eq!(settings.keys.rotate, vec!["x"]);
        assert_eq!(settings.keys.quit, vec!["q", "Esc"]);
        // Unspecified bindings keep their defaults
        assert_eq!(settings.keys.move_left, KeyBindings::default().move_left);
    }

    #[test]
    fn test_partial_game_section() {
        let text = r#"
            [game]
            gravity_ms = 250
        "#;
        let settings = Settings::from_toml(text).unwrap();
        assert_eq!(settings.game.gravity_ms, 250);
        assert_eq!(settings.game.board_width, 12);
        assert_eq!(settings.game.seed, None);
    }

    #[test]
    fn test_invalid_dimensions_fall_back() {
        let text = r#"
            [game]
            board_width = 2
            board_height = 2
        "#;
        let settings = Settings::from_toml(text).unwrap();
        assert_eq!(settings.game, GameConfig::default());
    }

    #[test]
    fn test_extreme_values_fall_back() {
        let far_spawn = Settings::from_toml("[game]\nspawn_x = 2147483647\n").unwrap();
        assert_eq!(far_spawn.game, GameConfig::default());

        let negative_spawn = Settings::from_toml("[game]\nspawn_y = -2147483648\n").unwrap();
        assert_eq!(negative_spawn.game, GameConfig::default());

        let huge_board =
            Settings::from_toml("[game]\nboard_width = 4294967296\nboard_height = 4294967296\n")
                .unwrap();
        assert_eq!(huge_board.game, GameConfig::default());
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(Settings::from_toml("keys = 3").is_err());
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars().0, "██");
        visual.block_style = "bracket".to_string();
        assert_eq!(visual.block_chars(), ("[]", "<>"));
    }
}
