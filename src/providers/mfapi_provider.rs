use crate::core::config::HttpConfig;
use crate::core::error::PipelineError;
use crate::core::series::{DatedSeries, SeriesId};
use crate::core::source::SeriesProvider;
use crate::providers::util::{build_client, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Official NAV history of a mutual fund scheme from mfapi.in.
pub struct MfApiProvider {
    base_url: String,
    scheme_code: u32,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl MfApiProvider {
    pub fn new(base_url: &str, scheme_code: u32, http: &HttpConfig) -> Result<Self> {
        Ok(MfApiProvider {
            base_url: base_url.to_string(),
            scheme_code,
            client: build_client(http)?,
            retries: http.retries,
            retry_delay_ms: http.retry_delay_ms,
        })
    }

    async fn fetch_history(&self, start: NaiveDate, end: NaiveDate) -> Result<DatedSeries> {
        let scheme_code = self.scheme_code;
        let url = format!("{}/mf/{}", self.base_url, scheme_code);
        debug!("Requesting NAV history from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Failed to send request for scheme: {scheme_code}"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for scheme: {scheme_code}"))?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response for scheme: {}", scheme_code));
        }

        let mfapi_response: MfApiResponse =
            serde_json::from_str(&response_text).with_context(|| {
                format!("Failed to parse mfapi response for scheme: {scheme_code}")
            })?;

        let total = mfapi_response.data.len();
        let points: Vec<(NaiveDate, f64)> = mfapi_response
            .data
            .iter()
            .filter_map(NavRecord::parse)
            .collect();
        if points.len() < total {
            debug!(
                skipped = total - points.len(),
                "Skipped malformed NAV records"
            );
        }

        let series = DatedSeries::from_unsorted(points).clip(start, end);
        if series.is_empty() {
            return Err(anyhow!(
                "No NAV records for scheme {} between {} and {}",
                scheme_code,
                start,
                end
            ));
        }

        debug!(
            scheme_name = mfapi_response
                .meta
                .as_ref()
                .and_then(|m| m.scheme_name.as_deref())
                .unwrap_or("N/A"),
            records = series.len(),
            "Retrieved NAV records in range"
        );
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct MfApiResponse {
    meta: Option<MfApiMeta>,
    data: Vec<NavRecord>,
}

#[derive(Debug, Deserialize)]
struct MfApiMeta {
    scheme_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NavRecord {
    date: Option<String>,
    nav: Option<NavValue>,
}

/// mfapi.in sends NAVs as strings, but tolerate plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NavValue {
    Text(String),
    Number(f64),
}

impl NavRecord {
    /// `None` for records with a missing or unparseable date or NAV.
    fn parse(&self) -> Option<(NaiveDate, f64)> {
        let date = NaiveDate::parse_from_str(self.date.as_deref()?, "%d-%m-%Y").ok()?;
        let nav = match self.nav.as_ref()? {
            NavValue::Text(text) => text.trim().parse::<f64>().ok()?,
            NavValue::Number(value) => *value,
        };
        nav.is_finite().then_some((date, nav))
    }
}

#[async_trait]
impl SeriesProvider for MfApiProvider {
    #[instrument(
        name = "MfApiNavFetch",
        skip(self),
        fields(scheme_code = self.scheme_code)
    )]
    async fn fetch_series(
        &self,
        series: SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> crate::core::error::Result<DatedSeries> {
        self.fetch_history(start, end)
            .await
            .map_err(|e| PipelineError::SourceUnavailable {
                series,
                reason: format!("{e:#}"),
            })
    }
}
