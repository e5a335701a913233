// =============================================================================
// Metrics & Company Overview
// =============================================================================
//
// Display-ready numbers for the dashboard header: the price summary with its
// fallbacks, the eight metric cards, the company overview, sector peers and
// the latest value of each computed indicator series.
//
// Provider facts win over values derived from bars; bars are the fallback.
// =============================================================================

use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::indicators::engine::RSI;
use crate::indicators::rsi::rsi_zone;
use crate::indicators::IndicatorSet;
use crate::market_data::{Bar, CompanyFacts, PriceMove};

const NOT_AVAILABLE: &str = "N/A";
const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Fixed sector → representative tickers map used for the peer strip.
pub const SECTOR_PEERS: [(&str, [&str; 5]); 6] = [
    ("Technology", ["AAPL", "MSFT", "GOOGL", "META", "NVDA"]),
    ("Healthcare", ["JNJ", "PFE", "UNH", "MRK", "ABBV"]),
    ("Finance", ["JPM", "BAC", "WFC", "C", "GS"]),
    ("Consumer", ["AMZN", "WMT", "PG", "KO", "MCD"]),
    ("Energy", ["XOM", "CVX", "COP", "SLB", "EOG"]),
    ("Industrial", ["CAT", "HON", "MMM", "GE", "BA"]),
];

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Abbreviate a number with K/M/B/T suffixes and two decimals.
///
/// `1_234_567.0` → `"1.23M"`, `999.0` → `"999.00"`, `-2_500.0` → `"-2.50K"`.
/// Values beyond the trillions keep the `T` suffix.
pub fn format_number(value: f64) -> String {
    let mut num = value;
    let mut magnitude = 0;
    while num.abs() >= 1000.0 && magnitude < SUFFIXES.len() - 1 {
        magnitude += 1;
        num /= 1000.0;
    }
    format!("{num:.2}{}", SUFFIXES[magnitude])
}

/// [`format_number`] with `"N/A"` for a missing value.
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_number)
}

fn fixed2(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

// ---------------------------------------------------------------------------
// Price summary
// ---------------------------------------------------------------------------

/// Headline price figures with bar-derived fallbacks applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub current_price: f64,
    pub previous_close: Option<f64>,
    pub change: f64,
    pub change_pct: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: f64,
}

impl PriceSummary {
    /// Resolve the summary from provider facts, falling back to `bars`.
    pub fn resolve(bars: &[Bar], facts: &CompanyFacts) -> Result<Self> {
        let last = bars.last().ok_or(DashboardError::EmptyData)?;

        let price = PriceMove::resolve(bars, facts).ok_or(DashboardError::EmptyData)?;

        let day_high = facts
            .day_high
            .unwrap_or_else(|| bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max));
        let day_low = facts
            .day_low
            .unwrap_or_else(|| bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min));

        Ok(Self {
            current_price: price.price,
            previous_close: price.previous_close,
            change: price.change,
            change_pct: price.change_pct,
            day_high,
            day_low,
            volume: facts.volume.unwrap_or(last.volume),
        })
    }

    pub fn direction(&self) -> Direction {
        if self.change >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl MetricCard {
    fn plain(title: &'static str, value: String) -> Self {
        Self {
            title,
            value,
            delta: None,
            direction: None,
        }
    }
}

/// The eight header cards, in display order.
pub fn metric_cards(summary: &PriceSummary, facts: &CompanyFacts) -> Vec<MetricCard> {
    let sign = if summary.change >= 0.0 { "+" } else { "" };
    let delta = format!(
        "{sign}{:.2} ({sign}{:.2}%)",
        summary.change, summary.change_pct
    );

    // A reported zero yield is a real value; only an absent one is N/A.
    let dividend = facts
        .dividend_yield
        .map_or_else(|| NOT_AVAILABLE.to_string(), |y| format!("{:.2}%", y * 100.0));

    vec![
        MetricCard {
            title: "Last Price",
            value: format!("{:.2} USD", summary.current_price),
            delta: Some(delta),
            direction: Some(summary.direction()),
        },
        MetricCard::plain("Day High", format!("{:.2} USD", summary.day_high)),
        MetricCard::plain("Day Low", format!("{:.2} USD", summary.day_low)),
        MetricCard::plain("Volume", format_number(summary.volume)),
        MetricCard::plain("Market Cap", format_optional(facts.market_cap)),
        MetricCard::plain("P/E Ratio", fixed2(facts.trailing_pe)),
        MetricCard::plain("Dividend Yield", dividend),
        MetricCard::plain(
            "52-Week Range",
            format!(
                "{} - {}",
                fixed2(facts.fifty_two_week_low),
                fixed2(facts.fifty_two_week_high)
            ),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Company overview & peers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyOverview {
    pub name: String,
    pub summary: Option<String>,
    pub sector: String,
    pub industry: String,
    pub country: String,
    pub employees: String,
    pub website: String,
    pub exchange: String,
}

impl CompanyOverview {
    pub fn from_facts(ticker: &str, facts: &CompanyFacts) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            name: facts.display_name(ticker).to_string(),
            summary: facts.long_business_summary.clone(),
            sector: text(&facts.sector),
            industry: text(&facts.industry),
            country: text(&facts.country),
            employees: facts
                .full_time_employees
                .map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string()),
            website: text(&facts.website),
            exchange: text(&facts.exchange),
        }
    }
}

/// Up to five same-sector tickers, excluding `ticker` itself.
///
/// Unknown or missing sectors yield no peers.
pub fn sector_peers(sector: Option<&str>, ticker: &str) -> Vec<&'static str> {
    let Some(sector) = sector else {
        return Vec::new();
    };
    SECTOR_PEERS
        .iter()
        .find(|(name, _)| *name == sector)
        .map(|(_, peers)| peers.iter().copied().filter(|t| *t != ticker).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Indicator summaries
// ---------------------------------------------------------------------------

/// Latest value of one computed series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSummary {
    pub name: String,
    pub value: Option<f64>,
    pub display: String,
    /// RSI only: OVERBOUGHT / OVERSOLD / NEUTRAL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<&'static str>,
}

/// One summary per series in `indicators`, in request order.
pub fn indicator_summaries(indicators: &IndicatorSet) -> Vec<IndicatorSummary> {
    indicators
        .series()
        .map(|series| {
            let value = indicators.latest(&series.name).ok();
            IndicatorSummary {
                name: series.name.clone(),
                value,
                display: format_optional(value),
                zone: value.filter(|_| series.name == RSI).map(rsi_zone),
            }
        })
        .collect()
}
