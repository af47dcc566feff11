//! Results of a pipeline pass.

use std::path::PathBuf;

/// Classification of a single conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The converter produced the PDF.
    Success,

    /// The source was a PDF and was copied.
    AlreadyPdf,

    /// A file already sits at the target; it is left untouched.
    TargetExists,

    /// The attempt failed; the source stays in staging.
    Failed { code: Option<i32>, message: String },

    /// The extension is not on the allow-list.
    UnsupportedType,
}

impl ConversionOutcome {
    /// Whether the source may be recycled.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::AlreadyPdf | Self::TargetExists)
    }
}

/// What one call to `handle()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Nothing was queued.
    Idle,

    /// The queued path disappeared before it could be handled.
    Vanished(PathBuf),

    /// The queued path was classified.
    Processed {
        source: PathBuf,
        outcome: ConversionOutcome,
    },
}
