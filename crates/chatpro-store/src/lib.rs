//! ChatPro store: key-value storage plus the saved prompts and theme catalog on top of it.
//!
//! Every concern persists under a single key of a [`KeyValueStore`]: the
//! prompt array under [`PROMPTS_KEY`], the selected theme id under
//! [`THEME_KEY`]. A missing backend degrades to empty reads and no-op writes.

pub mod kv;
pub mod prompts;
pub mod themes;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore, StorageChange};
pub use prompts::{Prompt, PromptStore, PROMPTS_KEY};
pub use themes::{
    theme_by_id, Theme, ThemeColors, ThemePreference, DEFAULT_THEME_ID, THEMES, THEME_KEY,
};
