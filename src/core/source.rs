//! Uniform source contract used by the pipeline.

use crate::core::error::{PipelineError, Result};
use crate::core::series::{DatedSeries, SeriesId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Something that can return a date-indexed series over an inclusive range.
///
/// Implementations own their transport, retries and wire format. They must
/// return `SourceUnavailable` rather than an empty series, and must never
/// invent values for missing days.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch_series(
        &self,
        series: SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DatedSeries>;
}

/// Routes each [`SeriesId`] to the provider responsible for it.
#[derive(Clone)]
pub struct SeriesSources {
    pub market_price: Arc<dyn SeriesProvider>,
    pub official_nav: Arc<dyn SeriesProvider>,
    pub fx_rate: Arc<dyn SeriesProvider>,
}

impl SeriesSources {
    /// Fetches one series and enforces the adapter guarantees.
    pub async fn fetch(
        &self,
        series: SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DatedSeries> {
        if start > end {
            return Err(PipelineError::InvalidRange { start, end });
        }

        let provider = match series {
            SeriesId::MarketPrice => &self.market_price,
            SeriesId::OfficialNav => &self.official_nav,
            SeriesId::FxRate => &self.fx_rate,
        };

        let fetched = provider.fetch_series(series, start, end).await?;
        let received = fetched.len();
        let clipped = fetched.clip(start, end);
        if clipped.len() != received {
            debug!(
                %series,
                dropped = received - clipped.len(),
                "Dropped observations outside the requested range"
            );
        }

        if clipped.is_empty() {
            return Err(PipelineError::SourceUnavailable {
                series,
                reason: format!("no observations between {start} and {end}"),
            });
        }
        Ok(clipped)
    }
}
