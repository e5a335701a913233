// =============================================================================
// Shared types used across the dashboard
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::indicators::bollinger::BB_PERIOD;
use crate::indicators::macd::{MACD_SIGNAL, MACD_SLOW};
use crate::indicators::rsi::RSI_PERIOD;

/// How the primary price trace is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    Candlestick,
    Line,
    Ohlc,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 3] = [Self::Candlestick, Self::Line, Self::Ohlc];
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::Candlestick
    }
}

impl std::fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Candlestick => write!(f, "candlestick"),
            Self::Line => write!(f, "line"),
            Self::Ohlc => write!(f, "ohlc"),
        }
    }
}

impl FromStr for ChartStyle {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candlestick" | "candle" => Ok(Self::Candlestick),
            "line" => Ok(Self::Line),
            "ohlc" => Ok(Self::Ohlc),
            _ => Err(DashboardError::UnknownChartStyle(s.trim().to_string())),
        }
    }
}

/// The closed set of supported technical indicators.
///
/// Labels are `SMA<n>`, `EMA<n>`, `BB`, `RSI` and `MACD`; anything else is
/// rejected when parsing rather than ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Bollinger,
    Rsi,
    Macd,
}

impl IndicatorKind {
    /// Selection offered by the dashboard sidebar.
    pub const PRESETS: [IndicatorKind; 8] = [
        Self::Sma(20),
        Self::Sma(50),
        Self::Sma(200),
        Self::Ema(20),
        Self::Ema(50),
        Self::Bollinger,
        Self::Rsi,
        Self::Macd,
    ];

    /// Fewest bars needed before every output series has a value.
    pub fn min_bars(&self) -> usize {
        match self {
            Self::Sma(n) | Self::Ema(n) => *n,
            Self::Bollinger => BB_PERIOD,
            Self::Rsi => RSI_PERIOD + 1,
            Self::Macd => MACD_SLOW + MACD_SIGNAL - 1,
        }
    }

    /// Whether the indicator is drawn on the price axis.
    pub fn is_price_overlay(&self) -> bool {
        matches!(self, Self::Sma(_) | Self::Ema(_) | Self::Bollinger)
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma(n) => write!(f, "SMA{n}"),
            Self::Ema(n) => write!(f, "EMA{n}"),
            Self::Bollinger => write!(f, "BB"),
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let upper = label.to_ascii_uppercase();
        let window = |digits: &str| digits.parse::<usize>().ok().filter(|n| *n > 0);

        let kind = match upper.as_str() {
            "BB" => Some(Self::Bollinger),
            "RSI" => Some(Self::Rsi),
            "MACD" => Some(Self::Macd),
            other => {
                if let Some(n) = other.strip_prefix("SMA").and_then(window) {
                    Some(Self::Sma(n))
                } else {
                    other.strip_prefix("EMA").and_then(window).map(Self::Ema)
                }
            }
        };

        kind.ok_or_else(|| DashboardError::UnknownIndicator(label.to_string()))
    }
}

impl TryFrom<String> for IndicatorKind {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IndicatorKind> for String {
    fn from(kind: IndicatorKind) -> Self {
        kind.to_string()
    }
}

/// Parse a comma-separated indicator list, keeping first occurrences in order.
///
/// Blank entries are skipped; an unknown label rejects the whole list.
pub fn parse_indicator_list(list: &str) -> Result<Vec<IndicatorKind>, DashboardError> {
    let mut kinds: Vec<IndicatorKind> = Vec::new();
    for label in list.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        let kind: IndicatorKind = label.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
