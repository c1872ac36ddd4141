use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::completion::DEFAULT_TIMEOUT;
use crate::credentials::MAX_CREDENTIALS;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub base_url: String,
    pub api_keys: Vec<String>,
    pub request_timeout_secs: u64,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_keys: Vec::new(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            theme: Theme::default(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// API keys in slot order: `GEMINI_API_KEY_1..=5` if any is set, else the config list.
    pub fn api_keys(&self) -> Vec<String> {
        resolve_api_keys(|name| std::env::var(name).ok(), &self.api_keys)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("paubra-chat").join("config.json"))
    }
}

fn resolve_api_keys<F>(env: F, configured: &[String]) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let from_env: Vec<String> = (1..=MAX_CREDENTIALS)
        .filter_map(|slot| env(&format!("GEMINI_API_KEY_{}", slot)))
        .filter(|key| !key.trim().is_empty())
        .collect();

    if from_env.is_empty() {
        configured.to_vec()
    } else {
        from_env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paubra-chat").join("config.json");
        let mut config = Config::new();
        config.theme = Theme::Dark;
        config.api_keys = vec!["abc".to_string()];
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_keys_take_precedence() {
        let env: HashMap<&str, &str> =
            [("GEMINI_API_KEY_1", "one"), ("GEMINI_API_KEY_3", "three"), ("GEMINI_API_KEY_2", "")]
                .into_iter()
                .collect();
        let keys = resolve_api_keys(
            |name| env.get(name).map(|v| v.to_string()),
            &["configured".to_string()],
        );
        assert_eq!(keys, ["one", "three"]);
    }

    #[test]
    fn test_config_keys_when_env_empty() {
        let keys = resolve_api_keys(|_| None, &["a".to_string(), "b".to_string()]);
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }
}
