// =============================================================================
// Dashboard Configuration
// =============================================================================
//
// Service-level settings: listen address, data provider, request defaults and
// the ticker lists offered by the UI.  Every field carries a serde default so
// a partial (or empty) `dashboard_config.json` still loads.  A handful of
// fields can be overridden from the environment (see `apply_env_overrides`).
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::market_data::yahoo::DEFAULT_BASE_URL;
use crate::types::{ChartStyle, IndicatorKind};

pub const ENV_BIND_ADDR: &str = "DASHBOARD_BIND_ADDR";
pub const ENV_POPULAR_TICKERS: &str = "DASHBOARD_POPULAR_TICKERS";
pub const ENV_DATA_URL: &str = "DASHBOARD_DATA_URL";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8501".to_string()
}

fn default_ticker() -> String {
    "AAPL".to_string()
}

fn default_period() -> String {
    "1y".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_indicators() -> Vec<IndicatorKind> {
    vec![IndicatorKind::Sma(20), IndicatorKind::Ema(20)]
}

fn default_popular_tickers() -> Vec<String> {
    ["AAPL", "GOOGL", "AMZN", "META", "MSFT", "TSLA", "NVDA", "JPM"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_periods() -> Vec<String> {
    ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "ytd", "max"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_data_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_peer_limit() -> usize {
    5
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    // --- Server -------------------------------------------------------------

    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Market data provider -----------------------------------------------

    /// Base URL of the chart / quote-summary API.
    #[serde(default = "default_data_url")]
    pub data_url: String,

    /// Per-request timeout for provider calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Request defaults ---------------------------------------------------

    #[serde(default = "default_ticker")]
    pub default_ticker: String,

    #[serde(default = "default_period")]
    pub default_period: String,

    #[serde(default = "default_interval")]
    pub default_interval: String,

    #[serde(default)]
    pub default_style: ChartStyle,

    /// Indicators applied when a request names none.
    #[serde(default = "default_indicators")]
    pub default_indicators: Vec<IndicatorKind>,

    // --- UI lists -----------------------------------------------------------

    /// Tickers shown in the market overview strip.
    #[serde(default = "default_popular_tickers")]
    pub popular_tickers: Vec<String>,

    /// Period labels offered by the period selector.
    #[serde(default = "default_periods")]
    pub periods: Vec<String>,

    /// Maximum number of sector peers quoted per dashboard.
    #[serde(default = "default_peer_limit")]
    pub peer_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_url: default_data_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_ticker: default_ticker(),
            default_period: default_period(),
            default_interval: default_interval(),
            default_style: ChartStyle::default(),
            default_indicators: default_indicators(),
            popular_tickers: default_popular_tickers(),
            periods: default_periods(),
            peer_limit: default_peer_limit(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or unreadable file is an error; the caller falls back to
    /// defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            popular = config.popular_tickers.len(),
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply `DASHBOARD_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|v| !v.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(url) = lookup(ENV_DATA_URL).filter(|v| !v.trim().is_empty()) {
            self.data_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(list) = lookup(ENV_POPULAR_TICKERS) {
            let tickers: Vec<String> = list
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
            if !tickers.is_empty() {
                self.popular_tickers = tickers;
            }
        }
    }
}
