//! Opening the staging tree for the user.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

#[cfg(target_os = "windows")]
const FILE_BROWSER: &str = "explorer";
#[cfg(target_os = "macos")]
const FILE_BROWSER: &str = "open";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const FILE_BROWSER: &str = "xdg-open";

/// Program used to show a directory.
pub fn file_browser() -> &'static str {
    FILE_BROWSER
}

/// Show `path` in the platform file browser without waiting for it.
///
/// Failure to launch is only logged.
pub fn open(path: &Path) {
    let result = Command::new(FILE_BROWSER)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match result {
        Ok(_) => debug!("Opened {} with {FILE_BROWSER}", path.display()),
        Err(e) => warn!("Could not open {} with {FILE_BROWSER}: {e}", path.display()),
    }
}
