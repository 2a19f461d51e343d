//! ChatPro core: the chat message model, configuration and errors.

pub mod config;
pub mod error;
pub mod message;

pub use config::{ChatProConfig, DataPaths};
pub use error::{Error, Result};
pub use message::{ChatMessage, Role};
