//! Summary statistics over the premium series.

use crate::core::error::{PipelineError, Result};
use crate::core::premium::round_to;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub std: f64,
    /// Latest value in date order.
    pub current: f64,
}

impl SummaryStats {
    /// Rounds every field for display.
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            min: round_to(self.min, decimals),
            max: round_to(self.max, decimals),
            average: round_to(self.average, decimals),
            median: round_to(self.median, decimals),
            p25: round_to(self.p25, decimals),
            p75: round_to(self.p75, decimals),
            std: round_to(self.std, decimals),
            current: round_to(self.current, decimals),
        }
    }
}

/// Percentile of already sorted values, interpolating linearly between ranks
/// at `p / 100 * (n - 1)`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Sample standard deviation; zero for a single value.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Summarizes premiums given in date order.
pub fn summarize(premiums: &[f64]) -> Result<SummaryStats> {
    let current = *premiums.last().ok_or(PipelineError::InsufficientData)?;

    let mut sorted = premiums.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = premiums.iter().sum::<f64>() / premiums.len() as f64;

    Ok(SummaryStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        average: mean,
        median: percentile(&sorted, 50.0),
        p25: percentile(&sorted, 25.0),
        p75: percentile(&sorted, 75.0),
        std: sample_std(premiums, mean),
        current,
    })
}
