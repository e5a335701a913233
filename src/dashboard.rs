// =============================================================================
// Dashboard Assembly
// =============================================================================
//
// Request validation and the pure pipeline from a fetched snapshot to the
// complete dashboard payload:
//
//   snapshot ─► compute_indicators ─► assemble_chart
//            └► PriceSummary ─► metric cards, overview, peers, summaries
//
// Fetching happens before this module; quoting peers happens after it.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::chart::{assemble_chart, ChartRequest, ChartSpec};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::indicators::compute_indicators;
use crate::market_data::MarketSnapshot;
use crate::metrics::{
    indicator_summaries, metric_cards, sector_peers, CompanyOverview, IndicatorSummary,
    MetricCard, PriceSummary,
};
use crate::types::{parse_indicator_list, ChartStyle, IndicatorKind};

/// Raw query parameters, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub ticker: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
    /// Comma-separated indicator labels, e.g. `SMA20,RSI`.
    pub indicators: Option<String>,
    pub style: Option<String>,
}

/// A validated dashboard request.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub ticker: String,
    pub period: String,
    pub interval: String,
    pub indicators: Vec<IndicatorKind>,
    pub style: ChartStyle,
}

impl DashboardRequest {
    /// Validate `query`, filling absent fields from `config`.
    ///
    /// The ticker is trimmed and upper-cased.  An explicitly empty indicator
    /// list means "no indicators"; an absent one means the configured default.
    pub fn from_query(query: DashboardQuery, config: &DashboardConfig) -> Result<Self> {
        let ticker = query
            .ticker
            .unwrap_or_else(|| config.default_ticker.clone())
            .trim()
            .to_uppercase();
        if ticker.is_empty() {
            return Err(DashboardError::BadRequest("ticker must not be empty".into()));
        }
        if !is_ticker_symbol(&ticker) {
            return Err(DashboardError::BadRequest(format!("invalid ticker: {ticker}")));
        }

        let label = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let indicators = match query.indicators {
            Some(list) => parse_indicator_list(&list)?,
            None => config.default_indicators.clone(),
        };

        let style = match query.style.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => config.default_style,
        };

        Ok(Self {
            ticker,
            period: label(query.period, &config.default_period),
            interval: label(query.interval, &config.default_interval),
            indicators,
            style,
        })
    }
}

/// Longest symbol accepted, with room for exchange suffixes like `.HK`.
const MAX_TICKER_LEN: usize = 20;

/// Exchange symbols: letters, digits and `.` `^` `=` `-` (e.g. `BRK-B`,
/// `^GSPC`, `EURUSD=X`, `0700.HK`), with at least one letter or digit.
fn is_ticker_symbol(ticker: &str) -> bool {
    ticker.len() <= MAX_TICKER_LEN
        && ticker.chars().any(|c| c.is_ascii_alphanumeric())
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-'))
}

/// Everything the dashboard page renders for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub ticker: String,
    pub company: CompanyOverview,
    pub price: PriceSummary,
    pub metrics: Vec<MetricCard>,
    pub indicators: Vec<IndicatorSummary>,
    pub chart: ChartSpec,
    /// Same-sector tickers to quote alongside the dashboard.
    pub peer_tickers: Vec<String>,
}

/// Build the dashboard for an already-fetched snapshot.
///
/// At most `peer_limit` peer tickers are returned.
pub fn build_dashboard(
    snapshot: &MarketSnapshot,
    request: &DashboardRequest,
    peer_limit: usize,
) -> Result<Dashboard> {
    let bars = &snapshot.bars;
    let facts = &snapshot.facts;

    let indicators = compute_indicators(bars, &request.indicators)?;
    let chart = assemble_chart(
        bars,
        &indicators,
        &ChartRequest {
            ticker: &request.ticker,
            period: &request.period,
            style: request.style,
        },
    )?;

    let price = PriceSummary::resolve(bars, facts)?;
    let metrics = metric_cards(&price, facts);

    let peer_tickers = sector_peers(facts.sector.as_deref(), &request.ticker)
        .into_iter()
        .take(peer_limit)
        .map(str::to_string)
        .collect();

    Ok(Dashboard {
        ticker: request.ticker.clone(),
        company: CompanyOverview::from_facts(&request.ticker, facts),
        price,
        metrics,
        indicators: indicator_summaries(&indicators),
        chart,
        peer_tickers,
    })
}
