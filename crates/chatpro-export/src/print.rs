//! Hand a printable page to the system browser.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

use chatpro_core::{Error, Result};

pub const PRINT_WINDOW_BLOCKED: &str =
    "Unable to open print window. Please check your popup blocker settings.";

fn opener() -> Command {
    #[cfg(target_os = "macos")]
    {
        Command::new("open")
    }
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Command::new("xdg-open")
    }
}

/// Open `page` (rendered with auto-print) so the browser shows its print
/// dialog. Fails with [`Error::PrintWindow`] when no browser can be launched.
pub fn open_for_print(page: &Path) -> Result<()> {
    let status = opener().arg(page).status();
    match status {
        Ok(status) if status.success() => {
            info!("opened {} for printing", page.display());
            Ok(())
        }
        Ok(status) => {
            warn!("print window opener exited with {}", status);
            Err(Error::PrintWindow(PRINT_WINDOW_BLOCKED.to_string()))
        }
        Err(e) => {
            warn!("could not launch print window opener: {}", e);
            Err(Error::PrintWindow(PRINT_WINDOW_BLOCKED.to_string()))
        }
    }
}
