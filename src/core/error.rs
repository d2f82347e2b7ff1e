//! Error taxonomy for a pipeline run.

use crate::core::series::SeriesId;
use chrono::NaiveDate;
use thiserror::Error;

/// Fatal errors that abort a pipeline run before anything is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested window is inverted.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A source produced no usable data for the whole requested range.
    #[error("Source unavailable for {series}: {reason}")]
    SourceUnavailable { series: SeriesId, reason: String },

    /// No date could be resolved across all three series.
    #[error("No common date range across price, NAV and FX series")]
    AlignmentEmpty,

    /// A zero or non-finite denominator reached the premium calculation.
    #[error("Division by zero computing premium on {date}: {detail}")]
    DivisionByZero { date: NaiveDate, detail: String },

    #[error("Insufficient data: at least one premium value is required")]
    InsufficientData,

    /// Parallel artifact columns disagree on length.
    #[error("Artifact field `{field}` has {actual} entries, expected {expected}")]
    ArtifactShape {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to persist artifact: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Failed to encode artifact: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
