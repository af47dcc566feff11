//! # Directory Watcher
//!
//! Observes the staging tree and hands newly created files to the conversion
//! pipeline.
//!
//! ## Features
//!
//! - **Recursive Watching**: One subscription covers the whole staging tree
//! - **Creation Filter**: Only plain-file creations are forwarded
//! - **Debounce**: Each file is held briefly before it is queued, so writers get a
//!   head start
//! - **Unbounded Queue**: The watcher never blocks on the consumer
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Watcher                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  notify callback ──► forwarder task ──► JobProducer            │
//! │       │                   │                   │                 │
//! │       ▼                   ▼                   ▼                 │
//! │  creation filter      debounce          JobConsumer::pop       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod queue;
pub mod watcher;

pub use config::WatcherConfig;
pub use error::{Result, WatcherError};
pub use event::{FileEvent, FileEventKind};
pub use queue::{JobConsumer, JobProducer, job_queue};
pub use watcher::{StagingWatcher, WatcherState};
