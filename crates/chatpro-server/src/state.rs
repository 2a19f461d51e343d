//! Shared application state.

use std::sync::Arc;

use chatpro_browser::{apply_theme, StyleRegistry};
use chatpro_core::{ChatProConfig, Result};
use chatpro_store::{
    theme_by_id, JsonFileStore, KeyValueStore, PromptStore, ThemePreference, DEFAULT_THEME_ID,
    THEME_KEY,
};
use parking_lot::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ChatProConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub prompts: PromptStore,
    pub theme: ThemePreference,
    /// Style elements the page should carry for the selected theme.
    pub styles: RwLock<StyleRegistry>,
}

impl AppState {
    pub fn new(config: ChatProConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let theme = ThemePreference::new(store.clone());
        let mut styles = StyleRegistry::new();
        match theme.selected_theme() {
            Ok(selected) => apply_theme(&mut styles, selected),
            Err(e) => {
                warn!("Could not read selected theme, using default: {}", e);
                apply_theme(&mut styles, theme_by_id(DEFAULT_THEME_ID));
            }
        }

        Self {
            prompts: PromptStore::new(store.clone()),
            theme,
            styles: RwLock::new(styles),
            store,
            config,
        }
    }

    /// State backed by the JSON storage file in the data directory.
    pub fn open(config: ChatProConfig) -> Result<Self> {
        let store = JsonFileStore::open(&config.data_paths.storage_file)?;
        info!("Storage file: {}", store.path().display());
        Ok(Self::new(config, Arc::new(store)))
    }
}

/// Re-apply the theme whenever the stored selection changes.
pub fn start_theme_sync(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let mut changes = state.store.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) if change.key == THEME_KEY => {
                    let id = change.new_value.as_str().unwrap_or(DEFAULT_THEME_ID);
                    apply_theme(&mut state.styles.write(), theme_by_id(id));
                    debug!("Theme styles refreshed for {}", id);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Theme sync skipped {} storage changes", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
