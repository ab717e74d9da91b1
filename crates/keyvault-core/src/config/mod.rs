//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Keyvault configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub storage: StorageConfig,
}

/// Endpoints and HTTP settings for live validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub github_api_url: String,
    pub anthropic_api_url: String,
    pub openai_api_url: String,
    pub anthropic_version: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

/// Where and under which names secrets are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Service name for OS keyring entries
    pub keyring_service: String,
    /// Namespace prefix; each type is stored under `<prefix>_<type>`
    pub key_prefix: String,
    /// Session storage entry holding the exported web cipher key
    pub cipher_key_name: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".to_string(),
            anthropic_api_url: "https://api.anthropic.com".to_string(),
            openai_api_url: "https://api.openai.com".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            user_agent: format!("keyvault/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            keyring_service: "keyvault".to_string(),
            key_prefix: "credential".to_string(),
            cipher_key_name: "keyvault_session_key".to_string(),
        }
    }
}

/// Keys accepted by `get` / `set`
const KEYS: [&str; 9] = [
    "validation.github_api_url",
    "validation.anthropic_api_url",
    "validation.openai_api_url",
    "validation.anthropic_version",
    "validation.user_agent",
    "validation.timeout_secs",
    "storage.keyring_service",
    "storage.key_prefix",
    "storage.cipher_key_name",
];

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow!(
        "Unknown configuration key: {}. Use `keyvault config list` to see available keys.",
        key
    )
}

fn require_http_url(name: &str, value: &str) -> anyhow::Result<()> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(anyhow!("{} must be an http(s) URL, got '{}'", name, value))
    }
}

fn require_non_empty(name: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        Err(anyhow!("{} must not be empty", name))
    } else {
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("KEYVAULT_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("keyvault")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let v = &self.validation;
        require_http_url("validation.github_api_url", &v.github_api_url)?;
        require_http_url("validation.anthropic_api_url", &v.anthropic_api_url)?;
        require_http_url("validation.openai_api_url", &v.openai_api_url)?;
        require_non_empty("validation.anthropic_version", &v.anthropic_version)?;
        require_non_empty("validation.user_agent", &v.user_agent)?;
        if v.timeout_secs == 0 {
            return Err(anyhow!("validation.timeout_secs must be greater than 0"));
        }

        let s = &self.storage;
        require_non_empty("storage.keyring_service", &s.keyring_service)?;
        require_non_empty("storage.key_prefix", &s.key_prefix)?;
        require_non_empty("storage.cipher_key_name", &s.cipher_key_name)?;
        if s.cipher_key_name.starts_with(&format!("{}_", s.key_prefix)) {
            return Err(anyhow!(
                "storage.cipher_key_name must not share the credential prefix '{}_'",
                s.key_prefix
            ));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        let value = match key {
            "validation.github_api_url" => self.validation.github_api_url.clone(),
            "validation.anthropic_api_url" => self.validation.anthropic_api_url.clone(),
            "validation.openai_api_url" => self.validation.openai_api_url.clone(),
            "validation.anthropic_version" => self.validation.anthropic_version.clone(),
            "validation.user_agent" => self.validation.user_agent.clone(),
            "validation.timeout_secs" => self.validation.timeout_secs.to_string(),
            "storage.keyring_service" => self.storage.keyring_service.clone(),
            "storage.key_prefix" => self.storage.key_prefix.clone(),
            "storage.cipher_key_name" => self.storage.cipher_key_name.clone(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a configuration value by key
    ///
    /// The whole configuration is re-validated; on error nothing changes.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut updated = self.clone();
        match key {
            "validation.github_api_url" => updated.validation.github_api_url = value.to_string(),
            "validation.anthropic_api_url" => {
                updated.validation.anthropic_api_url = value.to_string()
            }
            "validation.openai_api_url" => updated.validation.openai_api_url = value.to_string(),
            "validation.anthropic_version" => {
                updated.validation.anthropic_version = value.to_string()
            }
            "validation.user_agent" => updated.validation.user_agent = value.to_string(),
            "validation.timeout_secs" => {
                updated.validation.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }
            "storage.keyring_service" => updated.storage.keyring_service = value.to_string(),
            "storage.key_prefix" => updated.storage.key_prefix = value.to_string(),
            "storage.cipher_key_name" => updated.storage.cipher_key_name = value.to_string(),
            _ => return Err(unknown_key(key)),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
