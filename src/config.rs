use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::analysis::{ModelChoice, DEFAULT_ENDPOINT};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub default_model: Option<ModelChoice>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_default_model(model: ModelChoice) -> Result<()> {
        Self::save_default_model_to(&Self::get_config_path()?, model)
    }

    /// Update only the model. A file that fails to parse is left untouched.
    pub fn save_default_model_to(path: &Path, model: ModelChoice) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.default_model = Some(model);
        config.save_to(path)
    }

    /// Flag, then env (both arrive through clap), then file, then the built-in URL.
    pub fn resolve_endpoint(&self, override_url: Option<&str>) -> String {
        override_url
            .map(str::to_string)
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn resolve_model(&self, override_model: Option<ModelChoice>) -> ModelChoice {
        override_model.or(self.default_model).unwrap_or_default()
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("sentiment-tui").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: Some("http://localhost:9000/analyze/".to_string()),
            default_model: Some(ModelChoice::Llama),
        };

        config.save_to(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"llama\""));
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_default_model_keeps_endpoint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint": "http://prod:9000/analyze/"}"#).unwrap();

        Config::save_default_model_to(&path, ModelChoice::Llama).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://prod:9000/analyze/"));
        assert_eq!(config.default_model, Some(ModelChoice::Llama));
    }

    #[test]
    fn test_save_default_model_leaves_malformed_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{"endpoint": "http://prod:9000/analyze/",}"#;
        fs::write(&path, original).unwrap();

        assert!(Config::save_default_model_to(&path, ModelChoice::Llama).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_save_default_model_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        Config::save_default_model_to(&path, ModelChoice::Custom).unwrap();

        assert_eq!(Config::load_from(&path).unwrap().default_model, Some(ModelChoice::Custom));
    }

    #[test]
    fn test_endpoint_precedence() {
        let config = Config {
            endpoint: Some("http://file/analyze/".to_string()),
            default_model: None,
        };
        assert_eq!(config.resolve_endpoint(Some("http://flag/analyze/")), "http://flag/analyze/");
        assert_eq!(config.resolve_endpoint(None), "http://file/analyze/");
        assert_eq!(Config::default().resolve_endpoint(None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_model_precedence() {
        let config = Config {
            endpoint: None,
            default_model: Some(ModelChoice::Llama),
        };
        assert_eq!(config.resolve_model(Some(ModelChoice::Custom)), ModelChoice::Custom);
        assert_eq!(config.resolve_model(None), ModelChoice::Llama);
        assert_eq!(Config::default().resolve_model(None), ModelChoice::Custom);
    }
}
