//! Configuration management for the tree catalog TUI.
//!
//! Handles loading and saving configuration from JSONC files.
//! Manages the backend location, the login session, and display preferences.

use crate::session::Session;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config dir.
const APP_DIR: &str = "sponsor-tui";

/// Application configuration structure.
///
/// Contains backend endpoints, the session, and user preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API base URL
    pub base_url: String,
    /// Public website URL, used to open detail routes in a browser
    pub site_url: String,
    /// Symbol shown before prices
    pub currency_symbol: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Delay before a search request is sent (0 = every keystroke)
    pub search_debounce_ms: u64,
    /// Login session
    pub session: Session,
    /// Log file path (relative to config dir or absolute)
    pub log_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            site_url: "http://localhost:5173".to_string(),
            currency_symbol: "€".to_string(),
            request_timeout_secs: 30,
            search_debounce_ms: 0,
            session: Session::default(),
            log_path: "sponsor-tui.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    ///
    /// # Details
    /// Searches for config file in:
    /// 1. Provided path (if given)
    /// 2. `$XDG_CONFIG_HOME/sponsor-tui/config.jsonc`
    /// 3. `~/.config/sponsor-tui/config.jsonc`
    ///
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&strip_line_comments(&content))
            .with_context(|| format!("Failed to deserialize config: {}", config_path.display()))
    }

    /// Save configuration to file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    ///
    /// # Details
    /// Creates config directory if it doesn't exist.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, json)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get default configuration file path.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Path to config file or error
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        Ok(config_dir.join(APP_DIR).join("config.jsonc"))
    }

    /// Get log file path.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Path to log file or error
    ///
    /// # Details
    /// If log_path is absolute, returns it as-is.
    /// Otherwise, returns path relative to the config directory.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        let log_path = Path::new(&self.log_path);
        if log_path.is_absolute() {
            Ok(log_path.to_path_buf())
        } else {
            let config_dir = config_dir()
                .ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
            Ok(config_dir.join(APP_DIR).join(&self.log_path))
        }
    }

    /// Search debounce as a duration.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Full website URL for a detail route.
    ///
    /// # Arguments
    /// * `route` - Route starting with '/' (e.g. "/trees/a1")
    pub fn site_link(&self, route: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), route)
    }
}

/// Strip `//` line comments from JSONC, leaving `//` inside strings alone.
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| match line.find("//") {
            // Even quote count before the marker means it is not inside a string
            Some(pos) if line[..pos].matches('"').count() % 2 == 0 => line[..pos].trim_end(),
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
