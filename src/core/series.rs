//! Date-indexed series shared by every source adapter.

use chrono::NaiveDate;
use std::fmt::Display;

/// The three inputs the premium computation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesId {
    MarketPrice,
    OfficialNav,
    FxRate,
}

impl Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SeriesId::MarketPrice => "market_price",
                SeriesId::OfficialNav => "official_nav",
                SeriesId::FxRate => "fx_rate",
            }
        )
    }
}

/// Ordered `(date, value)` observations with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatedSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl DatedSeries {
    /// Builds a series from observations in any order.
    ///
    /// Observations are sorted by date; when a date repeats, the last one
    /// supplied wins.
    pub fn from_unsorted(mut points: Vec<(NaiveDate, f64)>) -> Self {
        // Stable sort keeps input order among equal dates, so reversing before
        // dedup retains the last occurrence.
        points.sort_by_key(|(date, _)| *date);
        points.reverse();
        points.dedup_by_key(|(date, _)| *date);
        points.reverse();
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(date, _)| *date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(date, _)| *date)
    }

    /// Keeps only observations within `[start, end]`.
    pub fn clip(self, start: NaiveDate, end: NaiveDate) -> Self {
        let points = self
            .points
            .into_iter()
            .filter(|(date, _)| *date >= start && *date <= end)
            .collect();
        Self { points }
    }

    /// Most recent observation on or before `date`.
    pub fn on_or_before(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        let idx = self.points.partition_point(|(d, _)| *d <= date);
        idx.checked_sub(1).map(|i| self.points[i])
    }
}

/// An inclusive span of calendar days with no observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl MissingRange {
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

/// Non-fatal report that a source has holes inside the requested window.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialData {
    pub series: SeriesId,
    pub missing: Vec<MissingRange>,
}

/// Finds stretches of more than `tolerance_days` calendar days without an
/// observation, including the edges of the requested window.
///
/// Ordinary weekends and market holidays fall inside the tolerance, so only
/// real outages are reported.
pub fn find_gaps(
    series: &DatedSeries,
    start: NaiveDate,
    end: NaiveDate,
    tolerance_days: i64,
) -> Vec<MissingRange> {
    let mut gaps = Vec::new();
    let mut expected_from = start;

    for date in series.dates() {
        if let Some(to) = date.pred_opt() {
            let gap = MissingRange {
                from: expected_from,
                to,
            };
            if gap.to >= gap.from && gap.days() > tolerance_days {
                gaps.push(gap);
            }
        }
        expected_from = match date.succ_opt() {
            Some(next) => next,
            None => return gaps,
        };
    }

    let trailing = MissingRange {
        from: expected_from,
        to: end,
    };
    if trailing.to >= trailing.from && trailing.days() > tolerance_days {
        gaps.push(trailing);
    }
    gaps
}
