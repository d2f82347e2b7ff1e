//! Currency-adjusted iNAV and premium computation.

use crate::core::align::AlignedRecord;
use crate::core::error::{PipelineError, Result};
use chrono::NaiveDate;

/// Precision applied to premium percentages unless configured otherwise.
pub const DEFAULT_PREMIUM_DECIMALS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PremiumRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub nav: f64,
    pub adjusted_inav: f64,
    pub fx_rate: f64,
    pub premium_pct: f64,
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// NAV scaled by the FX move since the NAV was struck.
pub fn adjusted_inav(record: &AlignedRecord) -> Result<f64> {
    if record.nav_day_fx_rate == 0.0 || !record.nav_day_fx_rate.is_finite() {
        return Err(PipelineError::DivisionByZero {
            date: record.date,
            detail: format!(
                "FX rate on NAV date {} is {}",
                record.nav_date, record.nav_day_fx_rate
            ),
        });
    }
    Ok(record.nav * (record.fx_rate / record.nav_day_fx_rate))
}

/// Premium of market price over the adjusted iNAV, in percent.
pub fn premium_pct(price: f64, adjusted_inav: f64, date: NaiveDate) -> Result<f64> {
    if adjusted_inav == 0.0 || !adjusted_inav.is_finite() {
        return Err(PipelineError::DivisionByZero {
            date,
            detail: format!("adjusted iNAV is {adjusted_inav}"),
        });
    }
    Ok((price - adjusted_inav) / adjusted_inav * 100.0)
}

/// Computes one premium record per aligned record, preserving order.
///
/// Any corrupt ratio aborts the whole computation.
pub fn compute_premiums(records: &[AlignedRecord], decimals: u32) -> Result<Vec<PremiumRecord>> {
    records
        .iter()
        .map(|record| {
            let adjusted_inav = adjusted_inav(record)?;
            let premium = premium_pct(record.price, adjusted_inav, record.date)?;
            Ok(PremiumRecord {
                date: record.date,
                price: record.price,
                nav: record.nav,
                adjusted_inav,
                fx_rate: record.fx_rate,
                premium_pct: round_to(premium, decimals),
            })
        })
        .collect()
}
