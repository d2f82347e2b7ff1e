//! Core pipeline: series, alignment, premium math and the published artifact

pub mod align;
pub mod artifact;
pub mod config;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod premium;
pub mod series;
pub mod source;
pub mod stats;

// Re-export main types for cleaner imports
pub use artifact::Artifact;
pub use error::PipelineError;
pub use pipeline::{PipelineOptions, PipelineRun, run_and_publish, run_pipeline};
pub use series::{DatedSeries, SeriesId};
pub use source::{SeriesProvider, SeriesSources};
