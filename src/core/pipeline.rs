//! One end-to-end run: fetch, align, price, summarize, assemble.

use crate::core::align::{FillPolicy, align_with};
use crate::core::artifact::Artifact;
use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::core::premium::{DEFAULT_PREMIUM_DECIMALS, compute_premiums};
use crate::core::series::{DatedSeries, PartialData, SeriesId, find_gaps};
use crate::core::source::SeriesSources;
use crate::core::stats::summarize;
use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use futures::future::try_join3;
use std::path::Path;
use tracing::{info, warn};

/// Two years of history.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 730;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub lookback_days: u32,
    /// Last day of the window; today when unset.
    pub end_date: Option<NaiveDate>,
    pub premium_decimals: u32,
    pub fill_policy: FillPolicy,
    pub gap_tolerance_days: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            end_date: None,
            premium_decimals: DEFAULT_PREMIUM_DECIMALS,
            fill_policy: FillPolicy::default(),
            gap_tolerance_days: 5,
        }
    }
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        PipelineOptions {
            lookback_days: config.lookback_days,
            end_date: None,
            premium_decimals: config.premium_decimals,
            fill_policy: FillPolicy {
                max_fill_days: config.max_fill_days,
            },
            gap_tolerance_days: config.gap_tolerance_days,
        }
    }
}

/// State owned by a single run and dropped with it.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub partial: Vec<PartialData>,
}

impl RunContext {
    pub fn new(options: &PipelineOptions) -> Self {
        let started_at = Utc::now();
        let end = options
            .end_date
            .unwrap_or_else(|| Local::now().date_naive());
        let start = end
            .checked_sub_days(Days::new(u64::from(options.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        RunContext {
            start,
            end,
            started_at,
            partial: Vec::new(),
        }
    }

    /// Logs and keeps any stretch of missing data in `data`.
    fn check_gaps(&mut self, series: SeriesId, data: &DatedSeries, tolerance_days: u32) {
        let missing = find_gaps(data, self.start, self.end, i64::from(tolerance_days));
        if missing.is_empty() {
            return;
        }
        for range in &missing {
            warn!(
                %series,
                from = %range.from,
                to = %range.to,
                days = range.days(),
                "Partial data: no observations in range"
            );
        }
        self.partial.push(PartialData { series, missing });
    }
}

/// Everything a run produced, ready to persist or display.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub artifact: Artifact,
    pub partial: Vec<PartialData>,
}

/// Runs the whole pipeline in memory.
///
/// Nothing is written here; on any error the caller has nothing to persist,
/// so a previously published artifact stays in place.
pub async fn run_pipeline(
    sources: &SeriesSources,
    options: &PipelineOptions,
) -> Result<PipelineRun> {
    let mut ctx = RunContext::new(options);
    info!(start = %ctx.start, end = %ctx.end, "Fetching series");

    let (price, nav, fx) = try_join3(
        sources.fetch(SeriesId::MarketPrice, ctx.start, ctx.end),
        sources.fetch(SeriesId::OfficialNav, ctx.start, ctx.end),
        sources.fetch(SeriesId::FxRate, ctx.start, ctx.end),
    )
    .await?;
    info!(
        prices = price.len(),
        navs = nav.len(),
        fx_rates = fx.len(),
        "Retrieved series"
    );

    for (series, data) in [
        (SeriesId::MarketPrice, &price),
        (SeriesId::OfficialNav, &nav),
        (SeriesId::FxRate, &fx),
    ] {
        ctx.check_gaps(series, data, options.gap_tolerance_days);
    }

    let aligned = align_with(&price, &nav, &fx, options.fill_policy)?;
    let premiums = compute_premiums(&aligned, options.premium_decimals)?;
    let values: Vec<f64> = premiums.iter().map(|p| p.premium_pct).collect();
    let stats = summarize(&values)?;
    let artifact = Artifact::from_records(&premiums, &stats, ctx.started_at)?;

    info!(
        data_points = artifact.data_points,
        current = stats.current,
        "Calculated premium"
    );

    Ok(PipelineRun {
        artifact,
        partial: ctx.partial,
    })
}

/// Runs the pipeline and atomically replaces the artifact at `path`.
pub async fn run_and_publish(
    sources: &SeriesSources,
    options: &PipelineOptions,
    path: &Path,
) -> Result<PipelineRun> {
    let run = run_pipeline(sources, options).await?;
    run.artifact.write_atomic(path)?;
    Ok(run)
}
