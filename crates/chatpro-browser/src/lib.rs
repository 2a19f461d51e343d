//! Host page heuristics for ChatGPT, Claude and Gemini.
//!
//! Everything here works on a [`Page`], an immutable parsed snapshot of the
//! host page's HTML. Nothing mutates the snapshot; the only write into the
//! host page is the text splice computed by [`InputField::insert`].

pub mod content;
pub mod extract;
pub mod input;
pub mod page;
pub mod scroll;
pub mod site;
pub mod style;

pub use extract::{extract_messages, Confidence, Extraction, ExtractionStrategy};
pub use input::{handle_message, locate_input, InputField, MessageResponse, RuntimeMessage};
pub use page::Page;
pub use scroll::{locate_scroll_container, scroll_script, ScrollContainer, ScrollDirection};
pub use site::{resolve_site, SiteConfig, SiteKind};
pub use style::{apply_theme, StyleRegistry, StyleSheet, PAGE_THEME_STYLE_ID, THEME_STYLE_ID};
