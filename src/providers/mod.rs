pub mod mfapi_provider;
pub mod util;
pub mod yahoo_finance;

use crate::core::config::AppConfig;
use crate::core::source::SeriesSources;
use anyhow::Result;
use std::sync::Arc;

/// Wires the configured upstreams to the three series the pipeline needs.
pub fn sources_from_config(config: &AppConfig) -> Result<SeriesSources> {
    let yahoo_url = &config.providers.yahoo.base_url;
    let instrument = &config.instrument;

    Ok(SeriesSources {
        market_price: Arc::new(yahoo_finance::YahooChartProvider::new(
            yahoo_url,
            &instrument.ticker,
            &config.http,
        )?),
        official_nav: Arc::new(mfapi_provider::MfApiProvider::new(
            &config.providers.mfapi.base_url,
            instrument.scheme_code,
            &config.http,
        )?),
        fx_rate: Arc::new(yahoo_finance::YahooChartProvider::new(
            yahoo_url,
            &instrument.fx_symbol,
            &config.http,
        )?),
    })
}
