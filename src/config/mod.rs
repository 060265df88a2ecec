// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Vitrine

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,

    /// Where the seeded archive comes from
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Download behaviour
    #[serde(default)]
    pub download: DownloadConfig,

    /// Presentation timings
    #[serde(default)]
    pub ui: UiConfig,

    /// Login session lifetime
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ArchiveConfig {
    /// JSON file with the seed artifacts. Built-in samples are used when unset.
    #[serde(default)]
    pub seed_path: Option<String>,
    /// Uploader recorded when the creation form leaves it blank
    #[serde(default = "default_uploader")]
    pub default_uploader: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DownloadConfig {
    /// Directory that relative image references resolve against
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    /// How long a closed detail panel keeps its artifact around
    #[serde(default = "default_close_delay")]
    pub detail_close_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Sessions untouched for this long are dropped
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Upper bound for the detail panel exit delay
pub const MAX_CLOSE_DELAY_MS: u64 = 10_000;

/// Upper bound for the session idle timeout (one week)
pub const MAX_IDLE_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

// Default value functions
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_uploader() -> String { "Current User".to_string() }
fn default_asset_root() -> String { "public".to_string() }
fn default_output_dir() -> String { "downloads".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_close_delay() -> u64 { 400 }
fn default_idle_timeout() -> u64 { 30 * 60 }

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            default_uploader: default_uploader(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            detail_close_delay_ms: default_close_delay(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::VitrineError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make the server unusable
    pub fn validate(&self) -> crate::Result<()> {
        if self.web.host.trim().is_empty() {
            return Err(crate::VitrineError::Config("web.host must not be empty".to_string()));
        }
        if self.download.timeout_secs == 0 {
            return Err(crate::VitrineError::Config(
                "download.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.ui.detail_close_delay_ms > MAX_CLOSE_DELAY_MS {
            return Err(crate::VitrineError::Config(format!(
                "ui.detail_close_delay_ms must be at most {}",
                MAX_CLOSE_DELAY_MS
            )));
        }
        if self.session.idle_timeout_secs == 0 || self.session.idle_timeout_secs > MAX_IDLE_TIMEOUT_SECS {
            return Err(crate::VitrineError::Config(format!(
                "session.idle_timeout_secs must be between 1 and {}",
                MAX_IDLE_TIMEOUT_SECS
            )));
        }
        Ok(())
    }

    /// Address the web server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.ui.detail_close_delay_ms, 400);
        assert!(config.archive.seed_path.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.web.port = 9191;
        config.archive.seed_path = Some("seed.json".to_string());
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.web.port, 9191);
        assert_eq!(loaded.archive.seed_path.as_deref(), Some("seed.json"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "web": { "port": 3000 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.archive.default_uploader, "Current User");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "download": { "timeout_secs": 0 } }"#).unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(crate::VitrineError::Config(_))
        ));
    }

    #[test]
    fn test_close_delay_bounds() {
        let mut config = AppConfig::default();
        config.ui.detail_close_delay_ms = 0;
        assert!(config.validate().is_ok());
        config.ui.detail_close_delay_ms = MAX_CLOSE_DELAY_MS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_idle_timeout_bounds() {
        let mut config = AppConfig::default();
        assert_eq!(config.session.idle_timeout_secs, 1800);
        config.session.idle_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.session.idle_timeout_secs = MAX_IDLE_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
        config.session.idle_timeout_secs = MAX_IDLE_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }
}
