use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    geolocation::Coordinates, provider::weatherapi::DEFAULT_BASE_URL,
    rate_limiter::RateLimitConfig,
};

pub const API_KEY_ENV: &str = "WEATHER_API_KEY";
pub const API_URL_ENV: &str = "WEATHER_API_URL";

pub const DEFAULT_LOCATION: &str = "New York";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_location = "Paris"
///
/// [rate_limit]
/// max_requests = 100
/// window_ms = 60000
///
/// [geolocation]
/// latitude = 48.85
/// longitude = 2.35
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WeatherAPI.com credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    /// Shown at startup when nothing was viewed before.
    pub default_location: String,
    pub rate_limit: RateLimitConfig,
    /// Where "use my location" points on a machine without a position service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            rate_limit: RateLimitConfig::default(),
            geolocation: None,
        }
    }
}

impl Config {
    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file(&Self::config_file_path()?)?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_file(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// `WEATHER_API_KEY` and `WEATHER_API_URL` win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted unit / last-location preferences.
    pub fn preferences_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("preferences.toml"))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Report a missing credential up front instead of on the first fetch.
    pub fn warn_if_unconfigured(&self) -> bool {
        if self.has_api_key() {
            return true;
        }
        tracing::warn!(
            "Weather API key not found. Set {API_KEY_ENV} or run `weather configure`."
        );
        false
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string()).filter(|k| !k.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, "https://api.weatherapi.com/v1");
        assert_eq!(cfg.default_location, "New York");
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.rate_limit.window_ms, 60_000);
        assert!(!cfg.has_api_key());
        assert!(!cfg.warn_if_unconfigured());
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("  KEY  ".into());
        cfg.default_location = "Paris".into();
        cfg.geolocation = Some(Coordinates::new(48.85, 2.35));
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_file(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.default_location, "Paris");
        assert_eq!(loaded.geolocation, Some(Coordinates::new(48.85, 2.35)));
        assert!(loaded.warn_if_unconfigured());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\n[rate_limit]\nmax_requests = 5\n").unwrap();

        let cfg = Config::load_file(&path).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.rate_limit.max_requests, 5);
        assert_eq!(cfg.rate_limit.window_ms, 60_000);
        assert_eq!(cfg.default_location, DEFAULT_LOCATION);
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> =
            HashMap::from([(API_KEY_ENV, "ENV_KEY"), (API_URL_ENV, "http://localhost:1234/v1")]);

        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());
        cfg.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(cfg.api_key.as_deref(), Some("ENV_KEY"));
        assert_eq!(cfg.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());
        cfg.apply_env_overrides(|_| Some("   ".to_string()));

        assert_eq!(cfg.api_key.as_deref(), Some("FILE_KEY"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }
}
