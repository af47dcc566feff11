//! # Converter
//!
//! The consuming side of autopdf. Each call to [`ConversionPipeline::handle`]
//! takes at most one staged file, turns it into a PDF at the mirrored location
//! in the persistent tree, and recycles the source once the outcome is positive.
//!
//! ## Outcomes
//!
//! | Outcome | Source |
//! |---------|--------|
//! | `Success` | recycled |
//! | `AlreadyPdf` (copied, no subprocess) | recycled |
//! | `TargetExists` (never overwritten) | recycled |
//! | `Failed { code, message }` | kept |
//! | `UnsupportedType` | kept |
//!
//! Conversions are strictly sequential; the external converter is never run
//! twice at once.

pub mod config;
pub mod error;
pub mod exit_code;
pub mod file_types;
pub mod notification;
pub mod office_to_pdf;
pub mod outcome;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{ConversionError, Result};
pub use exit_code::describe_exit_code;
pub use file_types::{SUPPORTED_EXTENSIONS, is_pdf, is_supported};
pub use notification::{Notification, NotificationLevel, Notifier};
pub use office_to_pdf::{ConverterExit, OfficeToPdf};
pub use outcome::{ConversionOutcome, Tick};
pub use pipeline::ConversionPipeline;
