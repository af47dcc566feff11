//! Running the OfficeToPDF executable.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{ConversionError, Result};

/// Flag that precedes the package directory on the command line.
pub const WORKING_DIR_FLAG: &str = "/working_dir";

/// How the converter process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterExit {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,

    /// Captured standard output.
    pub stdout: String,
}

/// Handle on the external converter binary.
#[derive(Debug, Clone)]
pub struct OfficeToPdf {
    binary: PathBuf,
    package_dir: PathBuf,
}

impl OfficeToPdf {
    pub fn new(binary: impl Into<PathBuf>, package_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            package_dir: package_dir.into(),
        }
    }

    /// Convert `source` into `target`, blocking until the converter exits.
    ///
    /// Invocation: `<binary> /working_dir <package-dir> <source> <target>`, all
    /// paths absolute. No timeout is applied.
    pub async fn convert(&self, source: &Path, target: &Path) -> Result<ConverterExit> {
        let binary = std::path::absolute(&self.binary)?;
        let package_dir = std::path::absolute(&self.package_dir)?;
        let source = std::path::absolute(source)?;
        let target = std::path::absolute(target)?;

        debug!(
            "Running {} {WORKING_DIR_FLAG} {} {} {}",
            binary.display(),
            package_dir.display(),
            source.display(),
            target.display()
        );

        let output = Command::new(&binary)
            .arg(WORKING_DIR_FLAG)
            .arg(&package_dir)
            .arg(&source)
            .arg(&target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|source| ConversionError::Spawn {
                binary: binary.display().to_string(),
                source,
            })?;

        Ok(ConverterExit {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
