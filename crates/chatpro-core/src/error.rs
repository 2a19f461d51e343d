//! Error types for ChatPro.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input field, scroll container or conversation missing from the page.
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    /// A document could not be produced or packaged.
    #[error("Export error: {0}")]
    Export(String),

    /// The print window could not be opened (usually a popup blocker).
    #[error("{0}")]
    PrintWindow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error should be shown to the user as a blocking notice
    /// rather than reported as a failure of the tool itself.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::PrintWindow(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
