//! TOML-based configuration system.
//!
//! Loads settings from a `config.toml` file, falling back to defaults. Every
//! struct implements `Default` so a missing or partial config file still
//! gives a usable browser.
//!
//! ## Config file search order
//!
//! 1. `TABBROWS_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Platform config directory (`$XDG_CONFIG_HOME/tabbrows/config.toml`,
//!    `%APPDATA%\TabBrows\config.toml` on Windows)
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::preferences::{SearchEngine, Settings, Theme};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TABBROWS_CONFIG";

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub appearance: AppearanceConfig,
    pub search: SearchConfig,
    pub icons: IconConfig,
    pub media: MediaConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Page opened by blank new tabs.
    pub home_url: String,
    /// Prefix of the window title (`"<window_title> - <page title>"`).
    pub window_title: String,
    /// Tabs opened at startup when no URL is given on the command line.
    pub startup_tabs: Vec<StartupTab>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupTab {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Window dimensions (logical pixels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub engine: SearchEngine,
}

/// Window icon candidates, tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub primary: PathBuf,
    pub secondary: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Exports the proprietary-codec engine flag at startup.
    pub proprietary_codecs: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls
// ─────────────────────────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        let home_url = "https://google.com/".to_string();
        Self {
            startup_tabs: vec![StartupTab {
                url: home_url.clone(),
                title: Some("Homepage".to_string()),
            }],
            home_url,
            window_title: "TabBrows".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("src/icons/icon.ico"),
            secondary: PathBuf::from("src/icons/icon.png"),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            proprietary_codecs: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading and saving
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads configuration from the first config file found. Never fails:
    /// returns defaults if no file is found or if parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }

    /// Loads a specific file, with the same fallbacks as [`Config::load`].
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "Configuration loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                Config::default()
            }
        }
    }

    /// Saves configuration to the platform config directory.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(&save_path())
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// User preferences the browser starts with.
    pub fn settings(&self) -> Settings {
        Settings {
            theme: self.appearance.theme,
            search_engine: self.search.engine,
        }
    }

    /// Stores applied preferences so the next [`Config::save`] persists them.
    pub fn set_settings(&mut self, settings: Settings) {
        self.appearance.theme = settings.theme;
        self.search.engine = settings.search_engine;
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
        warn!(path = %p.display(), "{CONFIG_ENV_VAR} does not point to a file");
    }

    // 2. Next to the executable
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. Platform config directory
    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from("config.toml");
    p.is_file().then_some(p)
}

/// Returns the platform-specific save path for the config file.
fn save_path() -> PathBuf {
    platform_config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("TabBrows"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("tabbrows"))
    }
}
