// =============================================================================
// Indicator Engine
// =============================================================================
//
// Turns a validated bar sequence plus a list of requested indicator kinds into
// named series aligned one-to-one with the bars.  Pure: identical input yields
// bit-identical output, and nothing is cached between calls.
// =============================================================================

use crate::error::{DashboardError, Result};
use crate::market_data::bar::{closes, validate_bars};
use crate::market_data::Bar;
use crate::types::IndicatorKind;

use super::bollinger::{calculate_bollinger, BB_NUM_STD, BB_PERIOD};
use super::ema::calculate_ema;
use super::macd::{calculate_macd, MACD_FAST, MACD_SIGNAL, MACD_SLOW};
use super::rsi::{calculate_rsi, RSI_PERIOD};
use super::series::IndicatorSeries;
use super::sma::calculate_sma;

pub const BB_UPPER: &str = "BB_Upper";
pub const BB_MID: &str = "BB_Mid";
pub const BB_LOWER: &str = "BB_Lower";
pub const MACD_LINE: &str = "MACD";
pub const MACD_SIGNAL_LINE: &str = "MACD_Signal";
pub const MACD_HIST: &str = "MACD_Hist";
pub const RSI: &str = "RSI";

/// The series produced for one requested indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorEntry {
    pub kind: IndicatorKind,
    pub series: Vec<IndicatorSeries>,
}

/// All requested indicators, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    bar_count: usize,
    entries: Vec<IndicatorEntry>,
}

impl IndicatorSet {
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn entries(&self) -> &[IndicatorEntry] {
        &self.entries
    }

    pub fn contains(&self, kind: IndicatorKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Every series of every indicator, flattened in request order.
    pub fn series(&self) -> impl Iterator<Item = &IndicatorSeries> {
        self.entries.iter().flat_map(|e| e.series.iter())
    }

    /// Look up a series by name (e.g. `"SMA20"`, `"BB_Upper"`).
    pub fn get(&self, name: &str) -> Option<&IndicatorSeries> {
        self.series().find(|s| s.name == name)
    }

    /// Most recent value of a named series.
    ///
    /// Fails with `InsufficientData` when the series never left its warm-up
    /// region, and with `UnknownIndicator` when no such series was computed.
    pub fn latest(&self, name: &str) -> Result<f64> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.series.iter().any(|s| s.name == name))
            .ok_or_else(|| DashboardError::UnknownIndicator(name.to_string()))?;

        entry
            .series
            .iter()
            .find(|s| s.name == name)
            .and_then(IndicatorSeries::last_value)
            .ok_or_else(|| DashboardError::InsufficientData {
                indicator: name.to_string(),
                required: entry.kind.min_bars(),
                available: self.bar_count,
            })
    }
}

/// Compute every requested indicator over `bars`.
///
/// Bars are validated first; a malformed bar aborts the whole computation.
/// Duplicate kinds are computed once, at their first position.  Indicators
/// whose window exceeds the history come back as all-`None` series.
pub fn compute_indicators(bars: &[Bar], kinds: &[IndicatorKind]) -> Result<IndicatorSet> {
    if bars.is_empty() {
        return Err(DashboardError::EmptyData);
    }
    validate_bars(bars)?;

    let closes = closes(bars);
    let len = closes.len();

    let mut entries: Vec<IndicatorEntry> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if entries.iter().any(|e| e.kind == kind) {
            continue;
        }
        entries.push(IndicatorEntry {
            kind,
            series: compute_kind(kind, &closes, len),
        });
    }

    Ok(IndicatorSet {
        bar_count: len,
        entries,
    })
}

fn compute_kind(kind: IndicatorKind, closes: &[f64], len: usize) -> Vec<IndicatorSeries> {
    let name = kind.to_string();
    match kind {
        IndicatorKind::Sma(n) => {
            vec![IndicatorSeries::from_compact(name, &calculate_sma(closes, n), len)]
        }
        IndicatorKind::Ema(n) => {
            vec![IndicatorSeries::from_compact(name, &calculate_ema(closes, n), len)]
        }
        IndicatorKind::Rsi => {
            vec![IndicatorSeries::from_compact(RSI, &calculate_rsi(closes, RSI_PERIOD), len)]
        }
        IndicatorKind::Bollinger => {
            let bands = calculate_bollinger(closes, BB_PERIOD, BB_NUM_STD);
            let upper: Vec<f64> = bands.iter().map(|b| b.upper).collect();
            let middle: Vec<f64> = bands.iter().map(|b| b.middle).collect();
            let lower: Vec<f64> = bands.iter().map(|b| b.lower).collect();
            vec![
                IndicatorSeries::from_compact(BB_UPPER, &upper, len),
                IndicatorSeries::from_compact(BB_MID, &middle, len),
                IndicatorSeries::from_compact(BB_LOWER, &lower, len),
            ]
        }
        IndicatorKind::Macd => {
            let out = calculate_macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
            vec![
                IndicatorSeries::from_compact(MACD_LINE, &out.macd, len),
                IndicatorSeries::from_compact(MACD_SIGNAL_LINE, &out.signal, len),
                IndicatorSeries::from_compact(MACD_HIST, &out.histogram, len),
            ]
        }
    }
}
