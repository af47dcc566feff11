//! Error types for the converter.

use thiserror::Error;

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Errors raised below the pipeline boundary.
///
/// [`ConversionPipeline::handle`](crate::ConversionPipeline::handle) never returns
/// these; it folds them into a `Failed` outcome.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter could not be started.
    #[error("failed to run converter {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    /// The staged path could not be mapped into the persistent tree.
    #[error("mirror error: {0}")]
    Mirror(#[from] autopdf_mirror::MirrorError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
