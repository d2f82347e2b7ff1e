use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::config::HttpConfig;
use crate::core::error::PipelineError;
use crate::core::series::{DatedSeries, SeriesId};
use crate::core::source::SeriesProvider;
use crate::providers::util::{build_client, with_retry};

/// Daily closes for one Yahoo Finance symbol.
///
/// Serves both the ETF's market price and the USD/INR rate; the symbol decides
/// which.
pub struct YahooChartProvider {
    base_url: String,
    symbol: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl YahooChartProvider {
    pub fn new(base_url: &str, symbol: &str, http: &HttpConfig) -> Result<Self> {
        Ok(YahooChartProvider {
            base_url: base_url.to_string(),
            symbol: symbol.to_string(),
            client: build_client(http)?,
            retries: http.retries,
            retry_delay_ms: http.retry_delay_ms,
        })
    }

    async fn fetch_daily(&self, start: NaiveDate, end: NaiveDate) -> Result<DatedSeries> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive upstream
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let url = format!("{}/v8/finance/chart/{}", self.base_url, self.symbol);
        debug!("Requesting chart data from {}", url);

        let query = [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
        ];
        let response = with_retry(
            || async {
                let response = self.client.get(&url).query(&query).send().await?;
                let status = response.status();
                // Rate limits and server errors are transient; 4xx bodies carry chart.error.
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    return response.error_for_status();
                }
                Ok::<_, reqwest::Error>(response)
            },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, self.symbol, url))?;

        let status = response.status();
        let text = response.text().await?;

        // Yahoo reports unknown symbols as a 404 with a JSON error body.
        let data: YahooChartResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                bail!("HTTP error: {} for symbol: {}", status, self.symbol)
            }
            Err(e) => bail!("Failed to parse JSON response for {}: {}", self.symbol, e),
        };

        if let Some(error) = data.chart.error {
            bail!(
                "Yahoo error for {}: {} ({})",
                self.symbol,
                error.description,
                error.code
            );
        }
        if !status.is_success() {
            bail!("HTTP error: {} for symbol: {}", status, self.symbol);
        }

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", self.symbol))?;

        let (points, skipped) = extract_daily_closes(&item);
        if skipped > 0 {
            debug!(skipped, "Skipped bars without a close");
        }
        if points.is_empty() {
            bail!("No price data returned for {}", self.symbol);
        }

        let series = DatedSeries::from_unsorted(points);
        debug!(
            records = series.len(),
            currency = item.meta.currency.as_deref().unwrap_or("N/A"),
            "Retrieved daily closes"
        );
        Ok(series)
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    currency: Option<String>,
    /// Exchange offset from UTC in seconds, as of the request.
    #[serde(default, alias = "gmtoffset")]
    gmt_offset: i64,
    /// IANA zone of the exchange, e.g. `Europe/London` for FX pairs.
    #[serde(default, rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
}

impl ChartMeta {
    /// Exchange-local calendar date of a bar timestamp.
    ///
    /// Resolved through the exchange's zone so each bar gets the offset in
    /// effect on its own day. `gmtoffset` only applies when the zone is
    /// missing or unknown.
    fn local_date(&self, timestamp: i64) -> Option<NaiveDate> {
        let tz = self
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok());
        match tz {
            Some(tz) => DateTime::from_timestamp(timestamp, 0)
                .map(|dt| dt.with_timezone(&tz).date_naive()),
            None => DateTime::from_timestamp(timestamp + self.gmt_offset, 0)
                .map(|dt| dt.date_naive()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Pairs each bar's exchange-local date with its close.
///
/// Adjusted closes win over raw closes when Yahoo supplies them. Bars with a
/// missing close are dropped and counted.
fn extract_daily_closes(item: &ChartItem) -> (Vec<(NaiveDate, f64)>, usize) {
    let (Some(timestamps), Some(indicators)) = (&item.timestamp, &item.indicators) else {
        return (Vec::new(), 0);
    };

    let closes = indicators
        .adjclose
        .first()
        .and_then(|a| a.adjclose.as_ref())
        .or_else(|| indicators.quote.first().and_then(|q| q.close.as_ref()));
    let Some(closes) = closes else {
        return (Vec::new(), timestamps.len());
    };

    let mut skipped = 0;
    let mut points = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let close = closes.get(i).copied().flatten().filter(|c| c.is_finite());
        let date = item.meta.local_date(*ts);
        match (date, close) {
            (Some(date), Some(close)) => points.push((date, close)),
            _ => skipped += 1,
        }
    }
    (points, skipped)
}

#[async_trait]
impl SeriesProvider for YahooChartProvider {
    #[instrument(
        name = "YahooChartFetch",
        skip(self),
        fields(symbol = %self.symbol)
    )]
    async fn fetch_series(
        &self,
        series: SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> crate::core::error::Result<DatedSeries> {
        self.fetch_daily(start, end)
            .await
            .map_err(|e| PipelineError::SourceUnavailable {
                series,
                reason: format!("{e:#}"),
            })
    }
}
