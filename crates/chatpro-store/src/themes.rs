//! Theme catalog and the persisted selected-theme pointer.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use chatpro_core::Result;

use crate::kv::KeyValueStore;

pub const THEME_KEY: &str = "chatgpt_pro_theme";

/// Theme that leaves the host page untouched.
pub const DEFAULT_THEME_ID: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub bg: &'static str,
    pub bg_secondary: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub border: &'static str,
    pub hover: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub colors: ThemeColors,
}

impl Theme {
    /// Whether applying this theme should strip page overrides.
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_THEME_ID
    }
}

const fn theme(id: &'static str, name: &'static str, c: [&'static str; 8]) -> Theme {
    Theme {
        id,
        name,
        colors: ThemeColors {
            bg: c[0],
            bg_secondary: c[1],
            text: c[2],
            text_secondary: c[3],
            accent: c[4],
            accent_text: c[5],
            border: c[6],
            hover: c[7],
        },
    }
}

// Colors: bg, bgSecondary, text, textSecondary, accent, accentText, border, hover.
#[rustfmt::skip]
pub static THEMES: &[Theme] = &[
    theme("default", "Default", ["#212121", "#2f2f2f", "#ececec", "#b4b4b4", "#10a37f", "#ffffff", "#444444", "#3a3a3a"]),
    // Dark / night
    theme("oled-black", "OLED Black", ["#000000", "#0a0a0a", "#e4e4e7", "#a1a1aa", "#10a37f", "#ffffff", "#1a1a1a", "#141414"]),
    theme("night-mode", "Night Mode", ["#1a1512", "#241f1a", "#e8e0d5", "#b8a99a", "#d4a574", "#1a1512", "#3d352c", "#2d2620"]),
    theme("soft-dark", "Soft Dark", ["#1e1e1e", "#282828", "#d4d4d4", "#9d9d9d", "#4fc3f7", "#1e1e1e", "#3c3c3c", "#333333"]),
    theme("dim", "Dim", ["#15202b", "#192734", "#d9d9d9", "#8899a6", "#1d9bf0", "#ffffff", "#38444d", "#22303c"]),
    // Aesthetic
    theme("midnight", "Midnight", ["#050816", "#0b1020", "#e5e7eb", "#9ca3af", "#10a37f", "#ffffff", "#1f2933", "#111827"]),
    theme("ocean-depths", "Ocean Depths", ["#0a192f", "#112240", "#ccd6f6", "#8892b0", "#64ffda", "#0a192f", "#233554", "#172a45"]),
    theme("rose-gold", "Rose Gold", ["#1a1418", "#231d21", "#f5e6e8", "#c9b8bb", "#e8b4b8", "#1a1418", "#3d3336", "#2d2528"]),
    theme("forest", "Forest", ["#0d1117", "#161b22", "#c9d1d9", "#8b949e", "#56d364", "#0d1117", "#30363d", "#21262d"]),
    theme("lavender-dreams", "Lavender Dreams", ["#13111c", "#1a1725", "#e2dff3", "#a9a5c0", "#9d8cff", "#13111c", "#2d2a3d", "#231f30"]),
];

/// Look up a theme, falling back to the first catalog entry.
pub fn theme_by_id(id: &str) -> &'static Theme {
    THEMES.iter().find(|t| t.id == id).unwrap_or(&THEMES[0])
}

/// The selected theme id, persisted under [`THEME_KEY`].
#[derive(Clone)]
pub struct ThemePreference {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl ThemePreference {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn selected(&self) -> Result<String> {
        let Some(backend) = &self.backend else {
            return Ok(DEFAULT_THEME_ID.to_string());
        };
        Ok(match backend.get(THEME_KEY)? {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => DEFAULT_THEME_ID.to_string(),
        })
    }

    pub fn selected_theme(&self) -> Result<&'static Theme> {
        Ok(theme_by_id(&self.selected()?))
    }

    pub fn select(&self, id: &str) -> Result<()> {
        let Some(backend) = &self.backend else {
            warn!("Storage not available, theme {} not persisted", id);
            return Ok(());
        };
        backend.set(THEME_KEY, Value::String(id.to_string()))?;
        info!("Selected theme: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<_> = THEMES.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), THEMES.len());
        assert_eq!(THEMES.len(), 10);
    }

    #[test]
    fn test_theme_by_id_fallback() {
        assert_eq!(theme_by_id("forest").name, "Forest");
        assert_eq!(theme_by_id("no-such-theme").id, DEFAULT_THEME_ID);
        assert!(theme_by_id("no-such-theme").is_default());
    }

    #[test]
    fn test_preference_defaults_and_persists() {
        let pref = ThemePreference::new(Arc::new(MemoryStore::new()));
        assert_eq!(pref.selected().unwrap(), DEFAULT_THEME_ID);

        pref.select("ocean-depths").unwrap();
        assert_eq!(pref.selected().unwrap(), "ocean-depths");
        assert_eq!(pref.selected_theme().unwrap().colors.accent, "#64ffda");
    }

    #[test]
    fn test_unavailable_preference() {
        let pref = ThemePreference::unavailable();
        pref.select("dim").unwrap();
        assert_eq!(pref.selected().unwrap(), DEFAULT_THEME_ID);
    }

    #[test]
    fn test_colors_serialize_camel_case() {
        let json = serde_json::to_value(theme_by_id("dim")).unwrap();
        assert_eq!(json["colors"]["bgSecondary"], "#192734");
        assert_eq!(json["colors"]["accentText"], "#ffffff");
    }
}
