//! # Mirror
//!
//! A staging tree replicates the directory skeleton (never the files) of a
//! persistent document tree. Files dropped anywhere in the staging tree have an
//! obvious destination: the same relative location under the persistent root.
//!
//! ```text
//! persistence_root/            staging_root/
//! ├── docs/                    ├── .autopdf_env   (marker, written last)
//! │   ├── report.pdf           ├── docs/
//! │   └── drafts/              │   └── drafts/
//! └── invoices/                └── invoices/
//! ```
//!
//! The marker's presence is the single source of truth for "this mirror is
//! complete". A staging root that has the marker is rebuilt (resync); a
//! non-empty one without it is refused.

pub mod environment;
pub mod error;
pub mod path_map;

pub use environment::{DestroyOutcome, MARKER_FILE_NAME, MirrorEnvironment, MirrorStatus, destroy, skeleton};
pub use error::{MirrorError, Result};
pub use path_map::{map_many, map_path};
