//! # autopdf
//!
//! Wires the components together into the `autopdf` binary.
//!
//! ```text
//! ┌───────────┐   ┌────────┐   ┌─────────┐   ┌───────────┐   ┌──────────┐
//! │ Installer │──►│ Mirror │──►│ Watcher │──►│ Job queue │──►│ Pipeline │
//! └───────────┘   └────────┘   └─────────┘   └───────────┘   └──────────┘
//!     gate          staging       notify        mpsc            one job
//!                   skeleton      + debounce                    per tick
//! ```
//!
//! The installer runs once before anything else. Ctrl-C cancels the run; the
//! loop stops between jobs, the watcher is stopped and the staging tree is
//! recycled.

pub mod app;
pub mod cli;
pub mod config;
pub mod file_browser;
pub mod logging;
pub mod notifier;

pub use app::{App, Session};
pub use cli::Cli;
pub use config::{AppConfig, ConfigError, PersistedConfig};
pub use notifier::LogNotifier;
