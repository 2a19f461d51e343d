//! Style elements injected into the host page, keyed by element id.

use serde::Serialize;
use tracing::debug;

use chatpro_store::{Theme, ThemeColors};

/// Variables sheet for the extension's own UI.
pub const THEME_STYLE_ID: &str = "chatgpt-pro-theme-overrides";
/// Override sheet for the host page; absent under the default theme.
pub const PAGE_THEME_STYLE_ID: &str = "chatgpt-pro-page-theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleSheet {
    pub id: String,
    pub css: String,
}

/// At most one style element per id, kept in insertion order.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    sheets: Vec<StyleSheet>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the element or replace its text. Returns true if it was created.
    pub fn ensure(&mut self, id: &str, css: impl Into<String>) -> bool {
        let css = css.into();
        if let Some(sheet) = self.sheets.iter_mut().find(|s| s.id == id) {
            sheet.css = css;
            return false;
        }
        debug!("creating style element #{}", id);
        self.sheets.push(StyleSheet {
            id: id.to_string(),
            css,
        });
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<StyleSheet> {
        let pos = self.sheets.iter().position(|s| s.id == id)?;
        Some(self.sheets.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&StyleSheet> {
        self.sheets.iter().find(|s| s.id == id)
    }

    pub fn sheets(&self) -> &[StyleSheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn render(&self) -> String {
        self.sheets
            .iter()
            .map(|s| format!("<style id=\"{}\">{}</style>", s.id, s.css))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn css_variables(colors: &ThemeColors) -> String {
    format!(
        ":host, :root {{
    --color-theme-bg: {};
    --color-theme-bg-secondary: {};
    --color-theme-text: {};
    --color-theme-text-secondary: {};
    --color-theme-accent: {};
    --color-theme-accent-text: {};
    --color-theme-border: {};
    --color-theme-hover: {};
}}",
        colors.bg,
        colors.bg_secondary,
        colors.text,
        colors.text_secondary,
        colors.accent,
        colors.accent_text,
        colors.border,
        colors.hover,
    )
}

pub fn page_overrides(c: &ThemeColors) -> String {
    format!(
        r#":root {{
    --main-surface-primary: {bg} !important;
    --main-surface-secondary: {bg2} !important;
    --main-surface-tertiary: {hover} !important;
    --sidebar-surface-primary: {bg} !important;
    --sidebar-surface-secondary: {bg2} !important;
    --text-primary: {text} !important;
    --text-secondary: {text2} !important;
    --border-light: {border} !important;
    --border-medium: {border} !important;
    --link: {accent} !important;
}}
html, body, main, [role="main"], nav, header, [class*="sidebar"], #thread-bottom {{
    background-color: {bg} !important;
}}
[class*="prose"], [class*="markdown"], p, span, div, h1, h2, h3, h4, h5, h6 {{
    color: {text} !important;
}}
[class*="text-token-text-secondary"], [class*="placeholder"], ::placeholder {{
    color: {text2} !important;
}}
button:not([class*="chatgpt-pro"]):hover, [role="menuitem"]:hover, [role="option"]:hover {{
    background-color: {hover} !important;
}}
textarea, input[type="text"], [contenteditable="true"], [data-composer-surface] {{
    background-color: {bg2} !important;
    color: {text} !important;
    border-color: {border} !important;
}}
.composer-submit-button-color {{
    background-color: {accent} !important;
    color: {accent_text} !important;
}}
[data-message-author-role="user"], [class*="user-message"] {{
    background-color: {bg2} !important;
    color: {text} !important;
}}
[data-message-author-role="assistant"], [class*="assistant-message"] {{
    background-color: {bg} !important;
    color: {text} !important;
}}
pre, code, [class*="code-block"] {{
    background-color: {bg2} !important;
    color: {text} !important;
    border-color: {border} !important;
}}
[role="menu"], [role="listbox"], [role="dialog"], [role="tooltip"], aside {{
    background-color: {bg2} !important;
    border-color: {border} !important;
}}
a:not([class*="chatgpt-pro"]) {{
    color: {accent} !important;
}}
[class*="border"], hr {{
    border-color: {border} !important;
}}
::-webkit-scrollbar {{
    width: 8px;
    height: 8px;
}}
::-webkit-scrollbar-track {{
    background: {bg};
}}
::-webkit-scrollbar-thumb {{
    background: {border};
    border-radius: 4px;
}}
::-webkit-scrollbar-thumb:hover {{
    background: {text2};
}}
::selection {{
    background-color: {accent}40 !important;
    color: {text} !important;
}}"#,
        bg = c.bg,
        bg2 = c.bg_secondary,
        text = c.text,
        text2 = c.text_secondary,
        accent = c.accent,
        accent_text = c.accent_text,
        border = c.border,
        hover = c.hover,
    )
}

/// Refresh the variables sheet and add or strip the page override sheet.
pub fn apply_theme(registry: &mut StyleRegistry, theme: &Theme) {
    registry.ensure(THEME_STYLE_ID, css_variables(&theme.colors));
    if theme.is_default() {
        if registry.remove(PAGE_THEME_STYLE_ID).is_some() {
            debug!("removed page theme overrides");
        }
    } else {
        registry.ensure(PAGE_THEME_STYLE_ID, page_overrides(&theme.colors));
    }
}
