use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::provider::Provider;
use crate::storage::FileStore;

pub const BASE_URL_ENV: &str = "ASKAWAY_BASE_URL";
pub const API_KEY_ENV: &str = "ASKAWAY_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Gateway.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Load from the user config dir, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::get_config_path()?)?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Environment values win over whatever the file says
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn provider(&self) -> Result<Provider> {
        match &self.provider {
            None => Ok(Provider::Gateway),
            Some(name) => Provider::from_str(name)
                .ok_or_else(|| anyhow!("Unknown provider '{}' (expected gateway or completions)", name)),
        }
    }

    pub fn base_url(&self) -> Result<String> {
        let provider = self.provider()?;
        Ok(self
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(FileStore::default_dir()?),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("askaway").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.provider().unwrap(), Provider::Gateway);
        assert_eq!(config.base_url().unwrap(), "http://localhost:8000");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("askaway").join("config.json");
        let config = Config {
            provider: Some("completions".to_string()),
            base_url: Some("http://gateway:9000".to_string()),
            model: Some("phi-3".to_string()),
            api_key: None,
            data_dir: Some(dir.path().join("data")),
            request_timeout_secs: Some(30),
        };
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider().unwrap(), Provider::Completions);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(loaded.data_dir().unwrap(), dir.path().join("data"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (BASE_URL_ENV, "http://env-host:8000"),
            (API_KEY_ENV, "sk-env"),
        ]
        .into_iter()
        .collect();

        let config = Config {
            base_url: Some("http://file-host:8000".to_string()),
            api_key: Some("sk-file".to_string()),
            ..Config::new()
        }
        .with_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.base_url.as_deref(), Some("http://env-host:8000"));
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config = Config {
            base_url: Some("http://file-host:8000".to_string()),
            ..Config::new()
        }
        .with_env_overrides(|_| Some(String::new()));
        assert_eq!(config.base_url.as_deref(), Some("http://file-host:8000"));
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let config = Config {
            provider: Some("carrier-pigeon".to_string()),
            ..Config::new()
        };
        assert!(config.provider().is_err());
    }
}
