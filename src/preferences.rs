//! User preferences shared by the whole browser window.
//!
//! Holds the two values the settings dialog edits:
//! - the chrome [`Theme`] (light or dark)
//! - the default [`SearchEngine`] used by the address bar resolver
//!
//! Everything runs on the UI thread, so the store is a plain
//! `Rc<RefCell<_>>` handle. Every clone sees writes made through any other
//! clone, which is what lets a new search engine apply to tabs that were
//! opened before the change.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Theme
// ─────────────────────────────────────────────────────────────────────────────

/// Chrome color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parses a theme name. Anything other than `dark` is light.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl From<String> for Theme {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SearchEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Search engine used when address-bar text is neither a URL nor a domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SearchEngine {
    #[default]
    Google,
    Bing,
    DuckDuckGo,
    Yahoo,
}

impl SearchEngine {
    /// Every engine offered by the settings dialog, in dropdown order.
    pub const ALL: [SearchEngine; 4] = [
        SearchEngine::Google,
        SearchEngine::Bing,
        SearchEngine::DuckDuckGo,
        SearchEngine::Yahoo,
    ];

    /// Parses an engine name as shown in the dropdown.
    ///
    /// Unknown names coerce to [`SearchEngine::Google`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Google" => Self::Google,
            "Bing" => Self::Bing,
            "DuckDuckGo" => Self::DuckDuckGo,
            "Yahoo" => Self::Yahoo,
            other => {
                debug!(engine = other, "Unknown search engine, using Google");
                Self::Google
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Yahoo => "Yahoo",
        }
    }

    /// Query template prefix. The `+`-joined query is appended as-is.
    pub fn query_prefix(self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search?q=",
            Self::Bing => "https://www.bing.com/search?q=",
            Self::DuckDuckGo => "https://duckduckgo.com/?q=",
            Self::Yahoo => "https://search.yahoo.com/search?p=",
        }
    }
}

impl From<String> for SearchEngine {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings + store
// ─────────────────────────────────────────────────────────────────────────────

/// Current preference values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
    pub search_engine: SearchEngine,
}

/// Shared handle to the window's [`Settings`].
///
/// Owned by the top-level controller and handed to the tab manager.
/// Confined to the UI thread (`!Send`).
#[derive(Debug, Clone, Default)]
pub struct SettingsStore(Rc<RefCell<Settings>>);

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self(Rc::new(RefCell::new(settings)))
    }

    /// Snapshot of the current values.
    pub fn get(&self) -> Settings {
        *self.0.borrow()
    }

    pub fn theme(&self) -> Theme {
        self.0.borrow().theme
    }

    pub fn search_engine(&self) -> SearchEngine {
        self.0.borrow().search_engine
    }

    /// Replaces both values. Used by the settings dialog's apply action.
    pub fn apply(&self, settings: Settings) {
        info!(
            theme = %settings.theme,
            search_engine = %settings.search_engine,
            "Settings applied"
        );
        *self.0.borrow_mut() = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_light_and_google() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.search_engine, SearchEngine::Google);
    }

    #[test]
    fn test_unknown_engine_coerces_to_google() {
        assert_eq!(SearchEngine::from_name("AltaVista"), SearchEngine::Google);
        assert_eq!(SearchEngine::from_name(""), SearchEngine::Google);
        assert_eq!(SearchEngine::from_name("bing"), SearchEngine::Google);
    }

    #[test]
    fn test_engine_names_roundtrip() {
        for engine in SearchEngine::ALL {
            assert_eq!(SearchEngine::from_name(engine.name()), engine);
        }
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("dark"), Theme::Dark);
        assert_eq!(Theme::from_name("Dark"), Theme::Dark);
        assert_eq!(Theme::from_name("light"), Theme::Light);
        assert_eq!(Theme::from_name("solarized"), Theme::Light);
    }

    #[test]
    fn test_store_clones_share_writes() {
        let store = SettingsStore::default();
        let reader = store.clone();

        store.apply(Settings {
            theme: Theme::Dark,
            search_engine: SearchEngine::Yahoo,
        });

        assert_eq!(reader.theme(), Theme::Dark);
        assert_eq!(reader.search_engine(), SearchEngine::Yahoo);
    }
}
