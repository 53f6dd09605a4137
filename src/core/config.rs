//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - The vibes API base URL used by the client
//! - Request timeout and TUI tick rate
//! - Server settings for `vibes serve`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, VibesError};

/// Default base URL of the vibes API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Default chat model used by the oracle
pub const DEFAULT_ORACLE_MODEL: &str = "gpt-3.5-turbo";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the vibes API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TUI refresh interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    /// Settings for `vibes serve`
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Treat every caller as the same user
    #[serde(default)]
    pub single_user: bool,

    /// Chat model used for fortunes and answers
    #[serde(default = "default_oracle_model")]
    pub oracle_model: String,

    /// Always answer with the canned fortune instead of calling OpenAI
    #[serde(default)]
    pub canned_oracle: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_tick_rate() -> u64 {
    250
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_oracle_model() -> String {
    DEFAULT_ORACLE_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            tick_rate_ms: default_tick_rate(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            single_user: false,
            oracle_model: default_oracle_model(),
            canned_oracle: false,
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "vibes", "vibes")
            .ok_or_else(|| VibesError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Path of the diagnostic log written while the TUI owns the terminal
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("vibes.log"))
    }

    /// Parsed API base URL
    pub fn api_base(&self) -> Result<Url> {
        parse_api_url(&self.api_url)
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// TUI tick rate as a `Duration`
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(16))
    }

    /// Set the API base URL after validating it
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        let parsed = parse_api_url(url)?;
        self.api_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(())
    }
}

/// Parse and validate an API base URL (http or https only)
pub fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(VibesError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.tick_rate_ms, 250);
        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert!(!config.server.single_user);
        assert_eq!(config.server.oracle_model, DEFAULT_ORACLE_MODEL);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("api_url = \"http://oracle.local:8080\"\n").unwrap();
        assert_eq!(config.api_url, "http://oracle.local:8080");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set_api_url("https://vibes.example.com/").unwrap();
        config.server.single_user = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.api_url, "https://vibes.example.com");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(parse_api_url("ftp://example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
        assert!(parse_api_url("http://localhost:5000").is_ok());
    }
}
