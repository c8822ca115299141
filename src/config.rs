//! Configuration file parser for ~/.config/kindling/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields`
//! off), though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::api::{DEFAULT_API_BASE, DEFAULT_SEARCH_BASE};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ids consumed from the upstream list per advance. A stride, not a
    /// target rendered count: the cursor moves this far even when the
    /// kind filter drops every record in the batch.
    pub batch_size: usize,

    /// Minimum gap between feed advances, whatever the trigger source.
    pub advance_throttle_ms: u64,

    /// Gap applied to scroll/sentinel signals before they reach the
    /// advance throttle.
    pub signal_throttle_ms: u64,

    /// How often the live-update monitor re-fetches the id list.
    pub live_poll_ms: u64,

    /// Quiet window before a typed search query executes.
    pub search_debounce_ms: u64,

    /// Keep fetched reply subtrees across collapse/expand cycles instead
    /// of re-fetching (the upstream default behavior is to re-fetch).
    pub cache_collapsed_subtrees: bool,

    /// Firebase API base; overridable for self-hosted mirrors and tests.
    pub api_base_url: String,

    /// Algolia search base; same deal.
    pub search_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 10,
            advance_throttle_ms: 1000,
            signal_throttle_ms: 200,
            live_poll_ms: 5000,
            search_debounce_ms: 300,
            cache_collapsed_subtrees: false,
            api_base_url: DEFAULT_API_BASE.to_string(),
            search_base_url: DEFAULT_SEARCH_BASE.to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "batch_size",
                "advance_throttle_ms",
                "signal_throttle_ms",
                "live_poll_ms",
                "search_debounce_ms",
                "cache_collapsed_subtrees",
                "api_base_url",
                "search_base_url",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        if config.batch_size == 0 {
            tracing::warn!("batch_size 0 is not usable, falling back to 1");
            config.batch_size = 1;
        }
        tracing::info!(path = %path.display(), batch_size = config.batch_size, "Loaded configuration");
        Ok(config)
    }

    pub fn advance_throttle(&self) -> Duration {
        Duration::from_millis(self.advance_throttle_ms)
    }

    pub fn signal_throttle(&self) -> Duration {
        Duration::from_millis(self.signal_throttle_ms)
    }

    pub fn live_poll_interval(&self) -> Duration {
        Duration::from_millis(self.live_poll_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.advance_throttle_ms, 1000);
        assert_eq!(config.signal_throttle_ms, 200);
        assert_eq!(config.live_poll_ms, 5000);
        assert_eq!(config.search_debounce_ms, 300);
        assert!(!config.cache_collapsed_subtrees);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/kindling_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.batch_size, 10);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("kindling_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "batch_size = 25\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.advance_throttle_ms, 1000); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("kindling_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
batch_size = 20
advance_throttle_ms = 500
signal_throttle_ms = 100
live_poll_ms = 10000
search_debounce_ms = 150
cache_collapsed_subtrees = true
api_base_url = "http://localhost:8080/v0"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.advance_throttle_ms, 500);
        assert_eq!(config.live_poll_ms, 10000);
        assert!(config.cache_collapsed_subtrees);
        assert_eq!(config.api_base_url, "http://localhost:8080/v0");
        assert_eq!(config.search_base_url, DEFAULT_SEARCH_BASE);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("kindling_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_batch_size_clamped() {
        let dir = std::env::temp_dir().join("kindling_config_test_zero_batch");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "batch_size = 0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.batch_size, 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("kindling_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "totally_fake_key = 42\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.batch_size, 10);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = std::env::temp_dir().join("kindling_config_test_wrongtype");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "batch_size = \"lots\"\n").unwrap();

        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
