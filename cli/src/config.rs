//! Startup configuration for the binary.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use autopdf_converter::PipelineConfig;
use autopdf_directory_watcher::WatcherConfig;
use autopdf_installer::InstallerConfig;
use autopdf_mirror::MARKER_FILE_NAME;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cli::Cli;

/// Directory below the platform data dir.
pub const DATA_DIR_NAME: &str = "autopdf";

/// Persisted roots, inside the data dir.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Converter package, inside the data dir.
pub const PACKAGE_DIR_NAME: &str = "package";

const PERSISTENCE_PROMPT: &str = "Root directory of your documents";
const TEMPORARY_PROMPT: &str = "Root directory for temporary replica";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A root is unset and prompting is not possible.
    #[error("configuration incomplete: {0} missing")]
    ConfigurationIncomplete(&'static str),

    /// The platform has no per-user data directory.
    #[error("no data directory available, pass --data-dir")]
    NoDataDir,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_path: Option<PathBuf>,
}

impl PersistedConfig {
    /// Read `path`. A missing or malformed file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => Ok(config.without_empty_paths()),
            Err(e) => {
                warn!("Ignoring malformed config {}: {e}", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Wrote config to {}", path.display());
        Ok(())
    }

    fn without_empty_paths(self) -> Self {
        let non_empty = |p: Option<PathBuf>| p.filter(|p| !p.as_os_str().is_empty());
        Self {
            persistence_path: non_empty(self.persistence_path),
            temporary_path: non_empty(self.temporary_path),
        }
    }
}

/// Everything the binary needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Holds `config.json`, the log and the converter package.
    pub data_dir: PathBuf,

    /// The user's document tree.
    pub persistence_root: PathBuf,

    /// The mirrored drop tree.
    pub staging_root: PathBuf,

    /// Look for converter updates at startup.
    pub check_for_update: bool,

    /// Open the staging tree in a file browser after creating it.
    pub open_browser: bool,
}

impl AppConfig {
    /// Resolve the configuration from flags, `config.json` and, when allowed,
    /// prompts on `input`/`output`.
    ///
    /// Flags win over the file. When both roots come from flags the file is
    /// neither read nor written; otherwise the resolved roots are written back.
    pub fn resolve<R: BufRead, W: Write>(cli: &Cli, input: &mut R, output: &mut W) -> Result<Self> {
        let data_dir = data_dir(cli)?;

        let (persistence_root, staging_root) = match (&cli.persistence_path, &cli.temporary_path) {
            (Some(persistence), Some(temporary)) => (persistence.clone(), temporary.clone()),
            (persistence, temporary) => {
                let config_path = data_dir.join(CONFIG_FILE_NAME);
                let stored = PersistedConfig::load(&config_path)?;

                let persistence = match persistence.clone().or(stored.persistence_path) {
                    Some(path) => path,
                    None if cli.no_input => {
                        return Err(ConfigError::ConfigurationIncomplete("persistence_path"));
                    }
                    None => prompt_path("persistence_path", PERSISTENCE_PROMPT, input, output)?,
                };
                let temporary = match temporary.clone().or(stored.temporary_path) {
                    Some(path) => path,
                    None if cli.no_input => {
                        return Err(ConfigError::ConfigurationIncomplete("temporary_path"));
                    }
                    None => prompt_path("temporary_path", TEMPORARY_PROMPT, input, output)?,
                };

                PersistedConfig {
                    persistence_path: Some(persistence.clone()),
                    temporary_path: Some(temporary.clone()),
                }
                .save(&config_path)?;

                (persistence, temporary)
            }
        };

        info!(
            "persistence root: {}, staging root: {}",
            persistence_root.display(),
            staging_root.display()
        );

        Ok(Self {
            data_dir,
            persistence_root,
            staging_root,
            check_for_update: !cli.no_update_check,
            open_browser: !cli.no_browser,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    pub fn package_dir(&self) -> PathBuf {
        self.data_dir.join(PACKAGE_DIR_NAME)
    }

    pub fn installer_config(&self) -> InstallerConfig {
        InstallerConfig::new(self.package_dir()).with_update_check(self.check_for_update)
    }

    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig::default().exclude(MARKER_FILE_NAME)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(self.installer_config().binary_path(), self.package_dir())
    }
}

/// `--data-dir`, or the default one.
pub fn data_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => default_data_dir(),
    }
}

/// `<platform data dir>/autopdf`.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

/// Ask until a non-empty line is entered. End of input counts as incomplete.
fn prompt_path<R: BufRead, W: Write>(
    field: &'static str,
    question: &str,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf> {
    writeln!(output, "{question}")?;
    loop {
        write!(output, " > ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(ConfigError::ConfigurationIncomplete(field));
        }

        let answer = line.trim();
        if !answer.is_empty() {
            writeln!(output)?;
            return Ok(PathBuf::from(answer));
        }
    }
}
