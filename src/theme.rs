//! Explicit theme context with pluggable persistence
//!
//! The light/dark preference is carried as an explicit context handed to
//! consumers rather than implicit global state, and persisted through a small
//! key-value store abstraction.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

const THEME_KEY: &str = "skycast-theme";

/// Minimal key-value persistence seam for UI preferences
pub trait KeyValueStore: Send + Sync {
    /// Read a stored value
    fn get(&self, key: &str) -> Option<String>;
    /// Store a value, replacing any previous one
    fn put(&self, key: &str, value: &str);
}

/// In-memory store; preferences live only as long as the process
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }
}

/// Color scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light color scheme
    Light,
    /// Dark color scheme (the default)
    #[default]
    Dark,
}

impl Theme {
    /// Stable name used for persistence
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// The other theme
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Theme preference handed down to consumers explicitly
pub struct ThemeContext {
    theme: Mutex<Theme>,
    store: Box<dyn KeyValueStore>,
}

impl ThemeContext {
    /// Load the persisted preference, falling back to the default theme
    #[must_use]
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let theme = store
            .get(THEME_KEY)
            .and_then(|value| Theme::parse(&value))
            .unwrap_or_default();
        debug!("loaded theme preference: {}", theme.as_str());
        Self {
            theme: Mutex::new(theme),
            store,
        }
    }

    /// The current theme
    #[must_use]
    pub fn current(&self) -> Theme {
        *self.theme.lock()
    }

    /// Set and persist the theme
    pub fn set(&self, theme: Theme) {
        *self.theme.lock() = theme;
        self.store.put(THEME_KEY, theme.as_str());
    }

    /// Flip between light and dark, persisting the result
    pub fn toggle(&self) -> Theme {
        let theme = self.current().flipped();
        self.set(theme);
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_dark_without_a_stored_preference() {
        let context = ThemeContext::load(Box::new(MemoryStore::new()));
        assert_eq!(context.current(), Theme::Dark);
    }

    #[test]
    fn toggle_persists_through_the_store() {
        let store = MemoryStore::new();
        store.put(THEME_KEY, "light");

        let context = ThemeContext::load(Box::new(store));
        assert_eq!(context.current(), Theme::Light);

        assert_eq!(context.toggle(), Theme::Dark);
        assert_eq!(context.current(), Theme::Dark);
    }

    #[test]
    fn garbage_in_the_store_falls_back_to_the_default() {
        let store = MemoryStore::new();
        store.put(THEME_KEY, "solarized");

        let context = ThemeContext::load(Box::new(store));
        assert_eq!(context.current(), Theme::Dark);
    }
}
