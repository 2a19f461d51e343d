//! Saved prompt snippets, persisted as one array under a single key.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use chatpro_core::Result;

use crate::kv::KeyValueStore;

pub const PROMPTS_KEY: &str = "chatgpt_pro_prompts";

/// A reusable prompt authored by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Prompt {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Prompt CRUD over a key-value store.
///
/// Every write rewrites the full array. There is no compare-and-swap, so two
/// writers racing on the same backing file end with the last writer's array.
#[derive(Clone)]
pub struct PromptStore {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl PromptStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A store with no backend: reads are empty and writes are dropped.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn list(&self) -> Result<Vec<Prompt>> {
        let Some(backend) = &self.backend else {
            warn!("Storage not available, returning empty prompt list");
            return Ok(Vec::new());
        };
        match backend.get(PROMPTS_KEY)? {
            Some(value) if !value.is_null() => Ok(serde_json::from_value(value)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Upsert by id: replace in place when the id exists, otherwise append.
    pub fn save(&self, prompt: Prompt) -> Result<()> {
        let Some(backend) = &self.backend else {
            warn!("Storage not available, prompt {} not saved", prompt.id);
            return Ok(());
        };
        let mut prompts = self.list()?;
        match prompts.iter().position(|p| p.id == prompt.id) {
            Some(index) => prompts[index] = prompt,
            None => prompts.push(prompt),
        }
        backend.set(PROMPTS_KEY, serde_json::to_value(&prompts)?)?;
        info!("Saved prompts: {} total", prompts.len());
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let Some(backend) = &self.backend else {
            warn!("Storage not available, prompt {} not deleted", id);
            return Ok(());
        };
        let mut prompts = self.list()?;
        prompts.retain(|p| p.id != id);
        backend.set(PROMPTS_KEY, serde_json::to_value(&prompts)?)?;
        Ok(())
    }
}
