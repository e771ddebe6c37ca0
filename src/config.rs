use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generator::Difficulty;
use crate::session::TestDuration;

const MAX_DURATION_SECS: u32 = 600;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_sound")]
    pub sound: bool,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "midnight".to_string()
}
fn default_duration_secs() -> u32 {
    60
}
fn default_sound() -> bool {
    true
}
fn default_leaderboard_size() -> usize {
    10
}
fn default_history_limit() -> usize {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            duration_secs: default_duration_secs(),
            difficulty: Difficulty::default(),
            sound: default_sound(),
            leaderboard_size: default_leaderboard_size(),
            history_limit: default_history_limit(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typedash")
            .join("config.toml")
    }

    /// Clamp numeric fields into usable ranges. Call after deserialization or
    /// after applying command-line overrides.
    pub fn validate(&mut self) {
        if self.duration_secs == 0 {
            warn!("duration_secs = 0 is not allowed, using default");
            self.duration_secs = default_duration_secs();
        }
        self.duration_secs = self.duration_secs.min(MAX_DURATION_SECS);
        self.leaderboard_size = self.leaderboard_size.clamp(1, 50);
        self.history_limit = self.history_limit.clamp(self.leaderboard_size, 10_000);
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    /// Reset `theme` to the default when it names no available theme.
    pub fn normalize_theme(&mut self, available: &[String]) {
        if !available.iter().any(|t| t == &self.theme) {
            warn!(theme = %self.theme, "unknown theme, using default");
            self.theme = default_theme();
        }
    }

    pub fn duration(&self) -> TestDuration {
        TestDuration::new(self.duration_secs).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.duration_secs, 60);
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert!(config.sound);
        assert_eq!(config.leaderboard_size, 10);
        assert_eq!(config.history_limit, 500);
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
theme = "daylight"
difficulty = "hard"
sound = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "daylight");
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(!config.sound);
        assert_eq!(config.duration_secs, 60);
    }

    #[test]
    fn test_config_rejects_unknown_difficulty() {
        assert!(toml::from_str::<Config>("difficulty = \"insane\"").is_err());
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config {
            duration_secs: 0,
            leaderboard_size: 0,
            history_limit: 1_000_000,
            log_level: "  ".to_string(),
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.duration_secs, 60);
        assert_eq!(config.leaderboard_size, 1);
        assert_eq!(config.history_limit, 10_000);
        assert_eq!(config.log_level, "info");

        config.duration_secs = 5_000;
        config.validate();
        assert_eq!(config.duration_secs, MAX_DURATION_SECS);
    }

    #[test]
    fn test_history_limit_covers_leaderboard() {
        let mut config = Config {
            leaderboard_size: 20,
            history_limit: 5,
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.history_limit, 20);
    }

    #[test]
    fn test_normalize_theme() {
        let available = vec!["midnight".to_string(), "daylight".to_string()];
        let mut config = Config {
            theme: "daylight".to_string(),
            ..Config::default()
        };
        config.normalize_theme(&available);
        assert_eq!(config.theme, "daylight");

        config.theme = "neon".to_string();
        config.normalize_theme(&available);
        assert_eq!(config.theme, "midnight");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            duration_secs: 120,
            difficulty: Difficulty::Easy,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.duration().secs(), 120);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
