//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay between opening the print document and invoking the print dialog,
/// so layout and paint have finished.
pub const PRINT_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Default delay before an export starts, matching the menu-close animation.
pub const DEFAULT_EXPORT_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_PORT: u16 = 3017;

/// Paths to all ChatPro data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Key-value storage file (`data/storage.json`).
    pub storage_file: PathBuf,
    /// Export output directory (`data/exports/`).
    pub exports: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            storage_file: root.join("storage.json"),
            exports: root.join("exports"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.exports)?;
        Ok(())
    }
}

/// Top-level ChatPro configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatProConfig {
    /// HTTP port of the companion service.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Pause before heavy export work starts.
    #[serde(with = "millis")]
    pub export_delay: Duration,
    /// Pause before the print dialog is invoked.
    #[serde(with = "millis")]
    pub print_settle_delay: Duration,
}

impl ChatProConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let export_delay = std::env::var("CHATPRO_EXPORT_DELAY_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_EXPORT_DELAY);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            export_delay,
            print_settle_delay: PRINT_SETTLE_DELAY,
        })
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
