//! Aligns price, NAV and FX series onto the market's trading days.

use crate::core::error::{PipelineError, Result};
use crate::core::series::DatedSeries;
use chrono::NaiveDate;
use tracing::{debug, info};

/// One trading day with every input resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub nav: f64,
    /// Publication date of the NAV in effect on `date`.
    pub nav_date: NaiveDate,
    pub fx_rate: f64,
    /// FX rate in effect when the NAV was struck.
    pub nav_day_fx_rate: f64,
}

/// How far forward-filled values may be carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillPolicy {
    /// Maximum age in calendar days of a carried NAV or FX value. `None`
    /// carries the last value indefinitely.
    pub max_fill_days: Option<u32>,
}

/// Aligns the three series with an unbounded forward fill.
pub fn align(
    price: &DatedSeries,
    nav: &DatedSeries,
    fx: &DatedSeries,
) -> Result<Vec<AlignedRecord>> {
    align_with(price, nav, fx, FillPolicy::default())
}

/// Aligns the three series on the market price calendar.
///
/// Each price date at or after the latest first observation among the inputs
/// gets the most recent NAV and FX values on or before it. The FX rate on the
/// NAV's own publication date is resolved the same way, so NAVs published on
/// FX holidays use the preceding FX close.
pub fn align_with(
    price: &DatedSeries,
    nav: &DatedSeries,
    fx: &DatedSeries,
    policy: FillPolicy,
) -> Result<Vec<AlignedRecord>> {
    let axis_start = [price.first_date(), nav.first_date(), fx.first_date()]
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .and_then(|firsts| firsts.into_iter().max())
        .ok_or(PipelineError::AlignmentEmpty)?;
    debug!(%axis_start, "Aligning on market price dates");

    let mut records = Vec::with_capacity(price.len());
    let mut unresolved = 0usize;
    let mut stale = 0usize;

    for &(date, price) in price.points().iter().filter(|(d, _)| *d >= axis_start) {
        let resolved = nav.on_or_before(date).and_then(|(nav_date, nav)| {
            let (fx_date, fx_rate) = fx.on_or_before(date)?;
            let (_, nav_day_fx_rate) = fx.on_or_before(nav_date)?;
            Some((nav_date, nav, fx_date, fx_rate, nav_day_fx_rate))
        });
        let Some((nav_date, nav, fx_date, fx_rate, nav_day_fx_rate)) = resolved else {
            debug!(%date, "No NAV or FX value resolvable, skipping");
            unresolved += 1;
            continue;
        };

        if let Some(limit) = policy.max_fill_days {
            let limit = i64::from(limit);
            let nav_age = (date - nav_date).num_days();
            let fx_age = (date - fx_date).num_days();
            if nav_age > limit || fx_age > limit {
                debug!(%date, nav_age, fx_age, limit, "Carried value too stale, skipping");
                stale += 1;
                continue;
            }
        }

        records.push(AlignedRecord {
            date,
            price,
            nav,
            nav_date,
            fx_rate,
            nav_day_fx_rate,
        });
    }

    if records.is_empty() {
        return Err(PipelineError::AlignmentEmpty);
    }

    info!(
        aligned = records.len(),
        unresolved,
        stale,
        from = %records[0].date,
        to = %records[records.len() - 1].date,
        "Aligned series"
    );
    Ok(records)
}
