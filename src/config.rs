use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::generator::problem::{Difficulty, OperationMode};

pub const MIN_PROBLEM_COUNT: usize = 1;
pub const MAX_PROBLEM_COUNT: usize = 100;
pub const MAX_AUTO_ADVANCE_MS: u64 = 5000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub operation: OperationMode,
    #[serde(default = "default_problem_count")]
    pub problem_count: usize,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_auto_advance_ms")]
    pub auto_advance_ms: u64,
    #[serde(default = "default_show_timer")]
    pub show_timer: bool,
}

fn default_problem_count() -> usize {
    5
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_auto_advance_ms() -> u64 {
    300
}
fn default_show_timer() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            operation: OperationMode::default(),
            problem_count: default_problem_count(),
            theme: default_theme(),
            auto_advance_ms: default_auto_advance_ms(),
            show_timer: default_show_timer(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathdr")
            .join("config.toml")
    }

    /// Clamp numeric settings into range and reset a theme that isn't installed.
    pub fn validate(&mut self, available_themes: &[String]) {
        self.problem_count = self
            .problem_count
            .clamp(MIN_PROBLEM_COUNT, MAX_PROBLEM_COUNT);
        self.auto_advance_ms = self.auto_advance_ms.min(MAX_AUTO_ADVANCE_MS);
        if !available_themes.iter().any(|t| *t == self.theme) {
            tracing::warn!("unknown theme {:?}, using default", self.theme);
            self.theme = default_theme();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes() -> Vec<String> {
        vec!["catppuccin-mocha".to_string(), "gruvbox-dark".to_string()]
    }

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(config.operation, OperationMode::Mixed);
        assert_eq!(config.problem_count, 5);
        assert_eq!(config.auto_advance_ms, 300);
        assert!(config.show_timer);
    }

    #[test]
    fn test_config_reads_lowercase_enums() {
        let toml_str = r#"
difficulty = "hard"
operation = "division"
problem_count = 20
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.operation, OperationMode::Division);
        assert_eq!(config.problem_count, 20);
        assert_eq!(config.theme, "catppuccin-mocha");
    }

    #[test]
    fn test_unknown_operation_is_an_error() {
        assert!(toml::from_str::<Config>("operation = \"modulo\"").is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.difficulty = Difficulty::Medium;
        config.operation = OperationMode::Subtraction;
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.difficulty, Difficulty::Medium);
        assert_eq!(deserialized.operation, OperationMode::Subtraction);
        assert_eq!(deserialized.problem_count, config.problem_count);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.problem_count = 0;
        config.auto_advance_ms = 60_000;
        config.validate(&themes());
        assert_eq!(config.problem_count, 1);
        assert_eq!(config.auto_advance_ms, 5000);

        config.problem_count = 999;
        config.validate(&themes());
        assert_eq!(config.problem_count, 100);
    }

    #[test]
    fn test_validate_resets_unknown_theme() {
        let mut config = Config::default();
        config.theme = "gruvbox-dark".to_string();
        config.validate(&themes());
        assert_eq!(config.theme, "gruvbox-dark");

        config.theme = "neon".to_string();
        config.validate(&themes());
        assert_eq!(config.theme, "catppuccin-mocha");
    }
}
