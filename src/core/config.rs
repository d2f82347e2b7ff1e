use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::premium::DEFAULT_PREMIUM_DECIMALS;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MfApiProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub yahoo: YahooProviderConfig,
    pub mfapi: MfApiProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            },
            mfapi: MfApiProviderConfig {
                base_url: "https://api.mfapi.in".to_string(),
            },
        }
    }
}

/// The ETF being tracked and the series needed to value it.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Exchange ticker of the ETF.
    pub ticker: String,
    /// mfapi.in scheme code publishing the official NAV.
    pub scheme_code: u32,
    /// Yahoo symbol of the USD/INR rate.
    pub fx_symbol: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        InstrumentConfig {
            ticker: "MON100.NS".to_string(),
            scheme_code: 114984,
            fx_symbol: "USDINR=X".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Extra attempts after the first failed request.
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: 30,
            retries: 2,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    pub instrument: InstrumentConfig,
    pub http: HttpConfig,
    /// History window in calendar days, ending today.
    pub lookback_days: u32,
    pub output_path: PathBuf,
    pub premium_decimals: u32,
    /// Optional cap on how many days a NAV or FX value may be carried forward.
    pub max_fill_days: Option<u32>,
    /// Calendar days without data before a source is reported as partial.
    pub gap_tolerance_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            instrument: InstrumentConfig::default(),
            http: HttpConfig::default(),
            lookback_days: 730,
            output_path: PathBuf::from("premium_data.json"),
            premium_decimals: DEFAULT_PREMIUM_DECIMALS,
            max_fill_days: None,
            gap_tolerance_days: 5,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "premtrack", "premtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
