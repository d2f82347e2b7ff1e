//! The persisted premium snapshot read by the dashboard.
//!
//! Field names and types here are a compatibility boundary: the dashboard
//! parses the JSON structurally.

use crate::core::error::{PipelineError, Result};
use crate::core::premium::{PremiumRecord, round_to};
use crate::core::stats::SummaryStats;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PRICE_DECIMALS: u32 = 2;
const FX_DECIMALS: u32 = 4;
const STATS_DECIMALS: u32 = 2;

/// Parallel per-day columns of an artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactColumns {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub navs: Vec<f64>,
    pub adjusted_inavs: Vec<f64>,
    pub usdinr: Vec<f64>,
    pub premiums: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub dates: Vec<NaiveDate>,
    pub premiums: Vec<f64>,
    pub prices: Vec<f64>,
    pub navs: Vec<f64>,
    pub adjusted_inavs: Vec<f64>,
    pub usdinr: Vec<f64>,
    pub stats: SummaryStats,
    pub last_updated: DateTime<Utc>,
    pub data_points: usize,
}

impl Artifact {
    /// Builds an artifact from parallel columns, rejecting ragged input.
    pub fn assemble(
        columns: ArtifactColumns,
        stats: SummaryStats,
        generated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let expected = columns.dates.len();
        for (field, actual) in [
            ("prices", columns.prices.len()),
            ("navs", columns.navs.len()),
            ("adjusted_inavs", columns.adjusted_inavs.len()),
            ("usdinr", columns.usdinr.len()),
            ("premiums", columns.premiums.len()),
        ] {
            if actual != expected {
                return Err(PipelineError::ArtifactShape {
                    field,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            dates: columns.dates,
            premiums: columns.premiums,
            prices: columns.prices,
            navs: columns.navs,
            adjusted_inavs: columns.adjusted_inavs,
            usdinr: columns.usdinr,
            stats,
            last_updated: generated_at,
            data_points: expected,
        })
    }

    /// Builds an artifact from premium records with display rounding applied.
    ///
    /// Premiums are already rounded by the calculator and are stored as is.
    pub fn from_records(
        records: &[PremiumRecord],
        stats: &SummaryStats,
        generated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let mut columns = ArtifactColumns::default();
        for record in records {
            columns.dates.push(record.date);
            columns.prices.push(round_to(record.price, PRICE_DECIMALS));
            columns.navs.push(round_to(record.nav, PRICE_DECIMALS));
            columns
                .adjusted_inavs
                .push(round_to(record.adjusted_inav, PRICE_DECIMALS));
            columns.usdinr.push(round_to(record.fx_rate, FX_DECIMALS));
            columns.premiums.push(record.premium_pct);
        }
        Self::assemble(columns, stats.rounded(STATS_DECIMALS), generated_at)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replaces the file at `path` without ever exposing a partial write.
    ///
    /// The artifact is written to a sibling temporary file, synced, then
    /// renamed over the destination.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = temp_path_for(path);
        debug!(path = %tmp_path.display(), "Writing artifact to temporary file");
        let written = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp_path, path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        info!(
            path = %path.display(),
            data_points = self.data_points,
            "Saved artifact"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}
