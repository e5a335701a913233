// =============================================================================
// Yahoo Finance Client: chart + quote summary endpoints
// =============================================================================
//
// Bars and price facts come from the public v8 chart endpoint.  Fundamentals
// (market cap, P/E, dividend yield, sector, profile) come from the v10 quote
// summary endpoint, which is fetched best-effort: it is frequently throttled
// and the dashboard is still useful without it.
// =============================================================================

use anyhow::{Context, Result};
use chrono::DateTime;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::source::{quote_from_snapshot, MarketDataSource, QUOTE_INTERVAL, QUOTE_PERIOD};
use super::{Bar, CompanyFacts, MarketSnapshot, QuoteCard};

/// Public Yahoo Finance API host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Modules requested from the quote summary endpoint.
const SUMMARY_MODULES: &str = "price,summaryDetail,assetProfile";

/// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-dashboard/1.0";

/// HTTP client for the Yahoo Finance chart and quote summary endpoints.
#[derive(Clone)]
pub struct YahooClient {
    base_url: reqwest::Url,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = reqwest::Url::parse(base_url)
            .with_context(|| format!("invalid market data url {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("market data url {base_url} cannot carry a path");
        }
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    /// Base URL extended with `segments`, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("market data url {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET /v8/finance/chart/{ticker}
    #[instrument(skip(self), name = "yahoo::chart")]
    pub async fn chart(&self, ticker: &str, period: &str, interval: &str) -> Result<MarketSnapshot> {
        let url = self.endpoint(&["v8", "finance", "chart", ticker])?;

        let resp = self
            .client
            .get(url)
            .query(&[("range", period), ("interval", interval)])
            .send()
            .await
            .with_context(|| format!("GET chart for {ticker} failed"))?;

        let status = resp.status();
        let body: ChartEnvelope = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {ticker} ({status})"))?;

        let snapshot = parse_chart(ticker, body)?;
        debug!(bars = snapshot.bars.len(), "chart retrieved");
        Ok(snapshot)
    }

    /// GET /v10/finance/quoteSummary/{ticker}
    #[instrument(skip(self), name = "yahoo::quote_summary")]
    pub async fn quote_summary(&self, ticker: &str) -> Result<CompanyFacts> {
        let url = self.endpoint(&["v10", "finance", "quoteSummary", ticker])?;

        let resp = self
            .client
            .get(url)
            .query(&[("modules", SUMMARY_MODULES)])
            .send()
            .await
            .with_context(|| format!("GET quoteSummary for {ticker} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("quoteSummary for {ticker} returned {status}");
        }

        let body: SummaryEnvelope = resp
            .json()
            .await
            .with_context(|| format!("failed to parse quoteSummary for {ticker}"))?;

        parse_summary(ticker, body)
    }
}

impl MarketDataSource for YahooClient {
    fn fetch<'a>(
        &'a self,
        ticker: &'a str,
        period: &'a str,
        interval: &'a str,
    ) -> BoxFuture<'a, Result<MarketSnapshot>> {
        Box::pin(async move {
            let mut snapshot = self.chart(ticker, period, interval).await?;

            match self.quote_summary(ticker).await {
                Ok(summary) => snapshot.facts.merge_missing(summary),
                Err(e) => warn!(ticker, error = %e, "quote summary unavailable; using chart facts only"),
            }

            Ok(snapshot)
        })
    }

    /// Quotes only need the chart; fundamentals are skipped.
    fn fetch_quote<'a>(&'a self, ticker: &'a str) -> BoxFuture<'a, Result<QuoteCard>> {
        Box::pin(async move {
            let snapshot = self.chart(ticker, QUOTE_PERIOD, QUOTE_INTERVAL).await?;
            quote_from_snapshot(&snapshot)
        })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("error"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    exchange_name: Option<String>,
    full_exchange_name: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEnvelope {
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    price: SummaryPrice,
    #[serde(default)]
    summary_detail: SummaryDetail,
    #[serde(default)]
    asset_profile: AssetProfile,
}

/// Yahoo wraps numbers as `{ "raw": 1.0, "fmt": "1.00" }` or `{}`.
#[derive(Debug, Default, Deserialize)]
struct Raw {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: Option<Raw>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryPrice {
    short_name: Option<String>,
    long_name: Option<String>,
    exchange_name: Option<String>,
    currency: Option<String>,
    market_cap: Option<Raw>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    market_cap: Option<Raw>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<Raw>,
    dividend_yield: Option<Raw>,
    previous_close: Option<Raw>,
    day_high: Option<Raw>,
    day_low: Option<Raw>,
    volume: Option<Raw>,
    fifty_two_week_high: Option<Raw>,
    fifty_two_week_low: Option<Raw>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    country: Option<String>,
    full_time_employees: Option<u64>,
    website: Option<String>,
    long_business_summary: Option<String>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Convert a chart response into bars plus price facts.
///
/// The meta `chartPreviousClose` is the close before the requested range, not
/// the last session's close, so the reference close is left to the quote
/// summary or the bars.
///
/// Rows where every price column is null are non-trading rows and are
/// dropped.  A row with only some nulls keeps NaN in the gaps so that bar
/// validation rejects it instead of silently patching values.
fn parse_chart(ticker: &str, body: ChartEnvelope) -> Result<MarketSnapshot> {
    if let Some(err) = body.chart.error {
        anyhow::bail!("chart for {ticker} failed: {err}");
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(MarketSnapshot {
            ticker: ticker.to_string(),
            ..Default::default()
        });
    };

    let columns = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &secs) in result.timestamp.iter().enumerate() {
        let prices = [
            at(&columns.open, i),
            at(&columns.high, i),
            at(&columns.low, i),
            at(&columns.close, i),
        ];
        if prices.iter().all(Option::is_none) {
            continue;
        }

        let timestamp = DateTime::from_timestamp(secs, 0)
            .with_context(|| format!("invalid timestamp {secs} in chart for {ticker}"))?;

        let [open, high, low, close] = prices.map(|p| p.unwrap_or(f64::NAN));
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: at(&columns.volume, i).unwrap_or(f64::NAN),
        });
    }

    let meta = result.meta;
    let facts = CompanyFacts {
        short_name: meta.short_name,
        long_name: meta.long_name,
        exchange: meta.full_exchange_name.or(meta.exchange_name),
        currency: meta.currency,
        current_price: meta.regular_market_price,
        previous_close: None,
        day_high: meta.regular_market_day_high,
        day_low: meta.regular_market_day_low,
        volume: meta.regular_market_volume,
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
        ..Default::default()
    };

    Ok(MarketSnapshot {
        ticker: ticker.to_string(),
        bars,
        facts,
    })
}

/// Value of column `col` at row `i`; short columns read as null.
fn at(col: &[Option<f64>], i: usize) -> Option<f64> {
    col.get(i).copied().flatten()
}

fn parse_summary(ticker: &str, body: SummaryEnvelope) -> Result<CompanyFacts> {
    if let Some(err) = body.quote_summary.error {
        anyhow::bail!("quoteSummary for {ticker} failed: {err}");
    }

    let result = body
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .with_context(|| format!("quoteSummary for {ticker} returned no result"))?;

    let SummaryResult {
        price,
        summary_detail: detail,
        asset_profile: profile,
    } = result;

    Ok(CompanyFacts {
        short_name: price.short_name,
        long_name: price.long_name,
        exchange: price.exchange_name,
        currency: price.currency,
        current_price: None,
        previous_close: raw(detail.previous_close),
        day_high: raw(detail.day_high),
        day_low: raw(detail.day_low),
        volume: raw(detail.volume),
        fifty_two_week_high: raw(detail.fifty_two_week_high),
        fifty_two_week_low: raw(detail.fifty_two_week_low),
        market_cap: raw(detail.market_cap).or(raw(price.market_cap)),
        trailing_pe: raw(detail.trailing_pe),
        dividend_yield: raw(detail.dividend_yield),
        sector: profile.sector,
        industry: profile.industry,
        country: profile.country,
        full_time_employees: profile.full_time_employees,
        website: profile.website,
        long_business_summary: profile.long_business_summary,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceMove;
    use serde_json::json;

    fn chart(value: serde_json::Value) -> Result<MarketSnapshot> {
        parse_chart("AAPL", serde_json::from_value(value).unwrap())
    }

    #[test]
    fn chart_parses_bars_and_meta() {
        let snapshot = chart(json!({
            "chart": {
                "result": [{
                    "meta": {
                        "currency": "USD",
                        "exchangeName": "NMS",
                        "fullExchangeName": "NasdaqGS",
                        "regularMarketPrice": 190.5,
                        "chartPreviousClose": 188.0,
                        "fiftyTwoWeekHigh": 199.6,
                        "fiftyTwoWeekLow": 164.1
                    },
                    "timestamp": [1704205800, 1704292200],
                    "indicators": { "quote": [{
                        "open":   [187.15, 184.22],
                        "high":   [188.44, 185.88],
                        "low":    [183.89, 183.43],
                        "close":  [185.64, 184.25],
                        "volume": [82488700.0, 58414500.0]
                    }]}
                }],
                "error": null
            }
        }))
        .unwrap();

        assert_eq!(snapshot.ticker, "AAPL");
        assert_eq!(snapshot.bars.len(), 2);
        assert_eq!(snapshot.bars[0].timestamp.timestamp(), 1704205800);
        assert!((snapshot.bars[1].close - 184.25).abs() < 1e-10);
        assert_eq!(snapshot.facts.current_price, Some(190.5));
        assert_eq!(snapshot.facts.previous_close, None);
        assert_eq!(snapshot.facts.exchange.as_deref(), Some("NasdaqGS"));
        assert_eq!(snapshot.facts.fifty_two_week_low, Some(164.1));
    }

    #[test]
    fn reference_close_comes_from_summary_then_bars() {
        let mut snapshot = chart(json!({
            "chart": { "result": [{
                "meta": { "regularMarketPrice": 190.5, "chartPreviousClose": 130.0 },
                "timestamp": [1704205800, 1704292200],
                "indicators": { "quote": [{
                    "open": [187.0, 186.0], "high": [189.0, 191.0],
                    "low": [185.0, 185.5], "close": [186.0, 190.0],
                    "volume": [1.0e7, 1.2e7]
                }]}
            }]}
        }))
        .unwrap();

        let from_bars = PriceMove::resolve(&snapshot.bars, &snapshot.facts).unwrap();
        assert_eq!(from_bars.previous_close, Some(186.0));

        let summary: SummaryEnvelope = serde_json::from_value(json!({
            "quoteSummary": { "result": [{
                "summaryDetail": { "previousClose": { "raw": 188.5 } }
            }]}
        }))
        .unwrap();
        snapshot.facts.merge_missing(parse_summary("AAPL", summary).unwrap());

        let merged = PriceMove::resolve(&snapshot.bars, &snapshot.facts).unwrap();
        assert_eq!(merged.previous_close, Some(188.5));
        assert!((merged.change - 2.0).abs() < 1e-10);
    }

    #[test]
    fn ticker_is_encoded_as_one_path_segment() {
        let client = YahooClient::new("http://127.0.0.1:9/", 1).unwrap();
        let url = client
            .endpoint(&["v8", "finance", "chart", "AAPL/../../v7/x?crumb=1#"])
            .unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/AAPL%2F..%2F..%2Fv7%2Fx%3Fcrumb=1%23");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = YahooClient::new("http://127.0.0.1:9/yahoo", 1).unwrap();
        let url = client.endpoint(&["v10", "finance", "quoteSummary", "BRK-B"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/yahoo/v10/finance/quoteSummary/BRK-B");
    }

    #[test]
    fn chart_skips_all_null_rows() {
        let snapshot = chart(json!({
            "chart": { "result": [{
                "timestamp": [1, 2, 3],
                "indicators": { "quote": [{
                    "open":   [1.0, null, 3.0],
                    "high":   [1.0, null, 3.0],
                    "low":    [1.0, null, 3.0],
                    "close":  [1.0, null, 3.0],
                    "volume": [10.0, null, 30.0]
                }]}
            }]}
        }))
        .unwrap();
        assert_eq!(snapshot.bars.len(), 2);
        assert!((snapshot.bars[1].close - 3.0).abs() < 1e-10);
    }

    #[test]
    fn chart_keeps_partial_rows_as_nan() {
        let snapshot = chart(json!({
            "chart": { "result": [{
                "timestamp": [1],
                "indicators": { "quote": [{
                    "open": [1.0], "high": [2.0], "low": [0.5], "close": [null], "volume": [5.0]
                }]}
            }]}
        }))
        .unwrap();
        assert_eq!(snapshot.bars.len(), 1);
        assert!(snapshot.bars[0].close.is_nan());
    }

    #[test]
    fn chart_error_is_reported() {
        let err = chart(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn chart_without_result_is_empty() {
        let snapshot = chart(json!({ "chart": { "result": [] } })).unwrap();
        assert!(snapshot.bars.is_empty());
    }

    #[test]
    fn summary_parses_fundamentals() {
        let body: SummaryEnvelope = serde_json::from_value(json!({
            "quoteSummary": {
                "result": [{
                    "price": { "shortName": "Apple Inc.", "exchangeName": "NasdaqGS" },
                    "summaryDetail": {
                        "marketCap": { "raw": 2.95e12, "fmt": "2.95T" },
                        "trailingPE": { "raw": 29.4 },
                        "dividendYield": {}
                    },
                    "assetProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics",
                        "fullTimeEmployees": 161000,
                        "longBusinessSummary": "Designs phones."
                    }
                }],
                "error": null
            }
        }))
        .unwrap();

        let facts = parse_summary("AAPL", body).unwrap();
        assert_eq!(facts.short_name.as_deref(), Some("Apple Inc."));
        assert_eq!(facts.market_cap, Some(2.95e12));
        assert_eq!(facts.trailing_pe, Some(29.4));
        assert_eq!(facts.dividend_yield, None);
        assert_eq!(facts.sector.as_deref(), Some("Technology"));
        assert_eq!(facts.full_time_employees, Some(161000));
    }

    #[test]
    fn summary_without_result_is_error() {
        let body: SummaryEnvelope =
            serde_json::from_value(json!({ "quoteSummary": { "result": [] } })).unwrap();
        assert!(parse_summary("AAPL", body).is_err());
    }
}
