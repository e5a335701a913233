// =============================================================================
// Chart Assembler
// =============================================================================
//
// Builds the chart description from bars and the already-computed indicator
// set.  Panel order is fixed:
//
//   1. Price: the primary trace (candlestick, OHLC or close line), then one
//      line per price-scale overlay in request order.  Bollinger adds an
//      upper and a lower line with the band shaded between them.
//   2. Secondary: RSI on a [0, 100] axis with 70/30 guides when requested,
//      otherwise volume bars on an auto-scaled axis.
//   3. MACD: only when requested.  Histogram, MACD line, signal line.
// =============================================================================

use std::collections::BTreeMap;

use crate::error::{DashboardError, Result};
use crate::indicators::engine::{
    BB_LOWER, BB_UPPER, MACD_HIST, MACD_LINE, MACD_SIGNAL_LINE, RSI,
};
use crate::indicators::rsi::{OVERBOUGHT, OVERSOLD};
use crate::indicators::IndicatorSet;
use crate::market_data::Bar;
use crate::types::{ChartStyle, IndicatorKind};

use super::spec::*;

const CANDLE_UP: &str = "#26a69a";
const CANDLE_DOWN: &str = "#ef5350";
const CLOSE_LINE: &str = "#3a7bd5";
const VOLUME_BAR: &str = "rgba(100, 100, 255, 0.5)";
const BB_LINE: &str = "rgba(150, 150, 150, 0.5)";
const BB_FILL: &str = "rgba(150, 150, 150, 0.1)";
const RSI_LINE: &str = "#9C27B0";
const MACD_COLOR: &str = "#2962FF";
const SIGNAL_COLOR: &str = "#FF6D00";
const HIST_COLOR: &str = "rgba(38, 166, 154, 0.6)";
const ZERO_LINE: &str = "rgba(150, 150, 150, 0.6)";

const OVERLAY_WIDTH: f64 = 1.5;
const BB_WIDTH: f64 = 1.0;

/// Title metadata for the figure.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub ticker: &'a str,
    pub period: &'a str,
    pub style: ChartStyle,
}

/// Assemble the chart for `bars`, overlaying every indicator in `indicators`
/// in the order it was requested.
pub fn assemble_chart(
    bars: &[Bar],
    indicators: &IndicatorSet,
    request: &ChartRequest<'_>,
) -> Result<ChartSpec> {
    if bars.is_empty() {
        return Err(DashboardError::EmptyData);
    }
    if indicators.bar_count() != bars.len() {
        return Err(DashboardError::MisalignedSeries {
            expected: bars.len(),
            actual: indicators.bar_count(),
        });
    }

    let mut columns = Columns::new(bars, indicators);

    // ── 1. Price panel ───────────────────────────────────────────────────
    let mut price = Panel {
        kind: PanelKind::Price,
        height: 0.0,
        y_axis: YAxis {
            title: "Price (USD)".to_string(),
            range: None,
        },
        traces: vec![primary_trace(request.style, &mut columns)],
        reference_lines: Vec::new(),
    };

    for entry in indicators.entries() {
        match entry.kind {
            IndicatorKind::Sma(_) | IndicatorKind::Ema(_) => {
                let name = entry.kind.to_string();
                columns.use_column(&name)?;
                price.traces.push(Trace::Line {
                    name: display_name(entry.kind),
                    y: name,
                    line: LineStyle {
                        color: overlay_color(entry.kind),
                        width: OVERLAY_WIDTH,
                    },
                    fill: None,
                    hover: true,
                });
            }
            IndicatorKind::Bollinger => {
                columns.use_column(BB_UPPER)?;
                columns.use_column(BB_LOWER)?;
                price.traces.push(Trace::Line {
                    name: "BB Upper".to_string(),
                    y: BB_UPPER.to_string(),
                    line: LineStyle { color: BB_LINE, width: BB_WIDTH },
                    fill: None,
                    hover: false,
                });
                price.traces.push(Trace::Line {
                    name: "BB Lower".to_string(),
                    y: BB_LOWER.to_string(),
                    line: LineStyle { color: BB_LINE, width: BB_WIDTH },
                    fill: Some(Fill {
                        mode: "tonexty",
                        color: BB_FILL,
                    }),
                    hover: false,
                });
            }
            IndicatorKind::Rsi | IndicatorKind::Macd => {}
        }
    }

    // ── 2. Secondary panel ───────────────────────────────────────────────
    let secondary = if indicators.contains(IndicatorKind::Rsi) {
        columns.use_column(RSI)?;
        Panel {
            kind: PanelKind::Rsi,
            height: 0.0,
            y_axis: YAxis {
                title: "RSI".to_string(),
                range: Some([0.0, 100.0]),
            },
            traces: vec![Trace::Line {
                name: "RSI".to_string(),
                y: RSI.to_string(),
                line: LineStyle {
                    color: RSI_LINE,
                    width: OVERLAY_WIDTH,
                },
                fill: None,
                hover: true,
            }],
            reference_lines: vec![
                ReferenceLine { y: OVERBOUGHT, color: "red", width: 1.0, dash: Dash::Dash },
                ReferenceLine { y: OVERSOLD, color: "green", width: 1.0, dash: Dash::Dash },
            ],
        }
    } else {
        columns.use_bar_column(COL_VOLUME);
        Panel {
            kind: PanelKind::Volume,
            height: 0.0,
            y_axis: YAxis {
                title: "Volume".to_string(),
                range: None,
            },
            traces: vec![Trace::Bar {
                name: "Volume".to_string(),
                y: COL_VOLUME.to_string(),
                color: VOLUME_BAR,
            }],
            reference_lines: Vec::new(),
        }
    };

    let mut panels = vec![price, secondary];

    // ── 3. MACD panel ────────────────────────────────────────────────────
    if indicators.contains(IndicatorKind::Macd) {
        for name in [MACD_HIST, MACD_LINE, MACD_SIGNAL_LINE] {
            columns.use_column(name)?;
        }
        panels.push(Panel {
            kind: PanelKind::Macd,
            height: 0.0,
            y_axis: YAxis {
                title: "MACD".to_string(),
                range: None,
            },
            traces: vec![
                Trace::Bar {
                    name: "MACD Histogram".to_string(),
                    y: MACD_HIST.to_string(),
                    color: HIST_COLOR,
                },
                Trace::Line {
                    name: "MACD".to_string(),
                    y: MACD_LINE.to_string(),
                    line: LineStyle { color: MACD_COLOR, width: OVERLAY_WIDTH },
                    fill: None,
                    hover: true,
                },
                Trace::Line {
                    name: "Signal".to_string(),
                    y: MACD_SIGNAL_LINE.to_string(),
                    line: LineStyle { color: SIGNAL_COLOR, width: OVERLAY_WIDTH },
                    fill: None,
                    hover: true,
                },
            ],
            reference_lines: vec![ReferenceLine {
                y: 0.0,
                color: ZERO_LINE,
                width: 1.0,
                dash: Dash::Dot,
            }],
        });
    }

    let heights: &[f64] = if panels.len() == 3 { &[0.6, 0.2, 0.2] } else { &[0.8, 0.2] };
    for (panel, &h) in panels.iter_mut().zip(heights) {
        panel.height = h;
    }

    Ok(ChartSpec {
        title: format!("{} {} Chart", request.ticker, request.period),
        x: bars.iter().map(|b| b.timestamp).collect(),
        data: columns.finish(),
        panels,
        layout: Layout::default(),
    })
}

// =============================================================================
// Internal helpers
// =============================================================================

fn primary_trace(style: ChartStyle, columns: &mut Columns<'_>) -> Trace {
    match style {
        ChartStyle::Candlestick | ChartStyle::Ohlc => {
            for name in [COL_OPEN, COL_HIGH, COL_LOW, COL_CLOSE] {
                columns.use_bar_column(name);
            }
            let (name, open, high, low, close) = (
                "Price".to_string(),
                COL_OPEN.to_string(),
                COL_HIGH.to_string(),
                COL_LOW.to_string(),
                COL_CLOSE.to_string(),
            );
            if style == ChartStyle::Candlestick {
                Trace::Candlestick {
                    name,
                    open,
                    high,
                    low,
                    close,
                    increasing_color: CANDLE_UP,
                    decreasing_color: CANDLE_DOWN,
                }
            } else {
                Trace::Ohlc {
                    name,
                    open,
                    high,
                    low,
                    close,
                    increasing_color: CANDLE_UP,
                    decreasing_color: CANDLE_DOWN,
                }
            }
        }
        ChartStyle::Line => {
            columns.use_bar_column(COL_CLOSE);
            Trace::Line {
                name: "Price".to_string(),
                y: COL_CLOSE.to_string(),
                line: LineStyle {
                    color: CLOSE_LINE,
                    width: 2.0,
                },
                fill: None,
                hover: true,
            }
        }
    }
}

/// Legend label, e.g. "SMA 20".
fn display_name(kind: IndicatorKind) -> String {
    match kind {
        IndicatorKind::Sma(n) => format!("SMA {n}"),
        IndicatorKind::Ema(n) => format!("EMA {n}"),
        other => other.to_string(),
    }
}

fn overlay_color(kind: IndicatorKind) -> &'static str {
    match kind {
        IndicatorKind::Sma(20) => "rgba(255, 255, 100, 0.8)",
        IndicatorKind::Sma(50) => "rgba(255, 100, 100, 0.8)",
        IndicatorKind::Sma(200) => "rgba(100, 180, 255, 0.8)",
        IndicatorKind::Sma(_) => "rgba(255, 255, 255, 0.6)",
        IndicatorKind::Ema(20) => "rgba(100, 255, 100, 0.8)",
        IndicatorKind::Ema(50) => "rgba(255, 170, 60, 0.8)",
        IndicatorKind::Ema(_) => "rgba(200, 120, 255, 0.8)",
        _ => BB_LINE,
    }
}

fn bar_field(bar: &Bar, column: &str) -> f64 {
    match column {
        COL_OPEN => bar.open,
        COL_HIGH => bar.high,
        COL_LOW => bar.low,
        COL_VOLUME => bar.volume,
        _ => bar.close,
    }
}

/// Collects the data columns referenced by traces.
struct Columns<'a> {
    bars: &'a [Bar],
    indicators: &'a IndicatorSet,
    data: BTreeMap<String, Vec<Option<f64>>>,
}

impl<'a> Columns<'a> {
    fn new(bars: &'a [Bar], indicators: &'a IndicatorSet) -> Self {
        Self {
            bars,
            indicators,
            data: BTreeMap::new(),
        }
    }

    fn use_bar_column(&mut self, name: &'static str) {
        let bars = self.bars;
        self.data
            .entry(name.to_string())
            .or_insert_with(|| bars.iter().map(|b| Some(bar_field(b, name))).collect());
    }

    fn use_column(&mut self, name: &str) -> Result<()> {
        if self.data.contains_key(name) {
            return Ok(());
        }
        let series = self
            .indicators
            .get(name)
            .ok_or_else(|| DashboardError::UnknownIndicator(name.to_string()))?;
        self.data.insert(name.to_string(), series.values.clone());
        Ok(())
    }

    fn finish(self) -> BTreeMap<String, Vec<Option<f64>>> {
        self.data
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute_indicators;
    use crate::market_data::bar::test_support::bars_from_closes;

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 50.0 + (i as f64 * 0.4).sin() * 4.0 + i as f64 * 0.05).collect()
    }

    fn build(style: ChartStyle, kinds: &[IndicatorKind]) -> ChartSpec {
        let bars = bars_from_closes(&closes(80));
        let set = compute_indicators(&bars, kinds).unwrap();
        assemble_chart(
            &bars,
            &set,
            &ChartRequest { ticker: "AAPL", period: "1y", style },
        )
        .unwrap()
    }

    fn trace_names(panel: &Panel) -> Vec<&str> {
        panel.traces.iter().map(Trace::name).collect()
    }

    #[test]
    fn empty_bars_fail() {
        let bars = bars_from_closes(&closes(5));
        let set = compute_indicators(&bars, &[]).unwrap();
        let err = assemble_chart(
            &[],
            &set,
            &ChartRequest { ticker: "AAPL", period: "1y", style: ChartStyle::Candlestick },
        )
        .unwrap_err();
        assert_eq!(err, DashboardError::EmptyData);
    }

    #[test]
    fn indicators_from_another_history_are_rejected() {
        let bars = bars_from_closes(&closes(10));
        let set = compute_indicators(&bars, &[IndicatorKind::Sma(5)]).unwrap();
        let err = assemble_chart(
            &bars[..8],
            &set,
            &ChartRequest { ticker: "AAPL", period: "1y", style: ChartStyle::Line },
        )
        .unwrap_err();
        assert_eq!(err, DashboardError::MisalignedSeries { expected: 8, actual: 10 });
    }

    #[test]
    fn default_layout_is_price_then_volume() {
        let chart = build(ChartStyle::Candlestick, &[]);
        assert_eq!(chart.title, "AAPL 1y Chart");
        assert_eq!(chart.panels.len(), 2);
        assert_eq!(chart.panels[0].kind, PanelKind::Price);
        assert_eq!(chart.panels[1].kind, PanelKind::Volume);
        assert!(matches!(chart.panels[0].traces[0], Trace::Candlestick { .. }));
        assert!(matches!(chart.panels[1].traces[0], Trace::Bar { .. }));
        assert_eq!(chart.panels[1].y_axis.range, None);
        assert_eq!(chart.panels[0].height, 0.8);
        assert_eq!(chart.panels[1].height, 0.2);
        assert_eq!(chart.x.len(), 80);
    }

    #[test]
    fn style_selects_primary_trace() {
        let line = build(ChartStyle::Line, &[]);
        assert!(matches!(&line.panels[0].traces[0], Trace::Line { y, .. } if y == COL_CLOSE));
        let ohlc = build(ChartStyle::Ohlc, &[]);
        assert!(matches!(ohlc.panels[0].traces[0], Trace::Ohlc { .. }));
    }

    #[test]
    fn overlays_follow_request_order() {
        let chart = build(
            ChartStyle::Candlestick,
            &[IndicatorKind::Ema(20), IndicatorKind::Bollinger, IndicatorKind::Sma(20)],
        );
        assert_eq!(
            trace_names(&chart.panels[0]),
            vec!["Price", "EMA 20", "BB Upper", "BB Lower", "SMA 20"]
        );
    }

    #[test]
    fn bollinger_lower_band_is_shaded() {
        let chart = build(ChartStyle::Candlestick, &[IndicatorKind::Bollinger]);
        match &chart.panels[0].traces[2] {
            Trace::Line { name, fill: Some(fill), hover, .. } => {
                assert_eq!(name, "BB Lower");
                assert_eq!(fill.mode, "tonexty");
                assert!(!hover);
            }
            other => panic!("unexpected trace {other:?}"),
        }
        assert!(chart.data.contains_key(BB_UPPER));
        assert!(!chart.data.contains_key("BB_Mid"));
    }

    #[test]
    fn rsi_replaces_volume() {
        let chart = build(ChartStyle::Candlestick, &[IndicatorKind::Sma(20), IndicatorKind::Rsi]);
        let secondary = &chart.panels[1];
        assert_eq!(secondary.kind, PanelKind::Rsi);
        assert_eq!(secondary.y_axis.range, Some([0.0, 100.0]));
        let guides: Vec<f64> = secondary.reference_lines.iter().map(|l| l.y).collect();
        assert_eq!(guides, vec![70.0, 30.0]);
        assert!(chart.panel(PanelKind::Volume).is_none());
        assert!(!chart.data.contains_key(COL_VOLUME));
        // RSI never lands on the price axis.
        assert_eq!(trace_names(&chart.panels[0]), vec!["Price", "SMA 20"]);
    }

    #[test]
    fn macd_adds_third_panel() {
        let chart = build(ChartStyle::Candlestick, &[IndicatorKind::Macd]);
        assert_eq!(chart.panels.len(), 3);
        assert_eq!(chart.panels[1].kind, PanelKind::Volume);
        let macd = &chart.panels[2];
        assert_eq!(macd.kind, PanelKind::Macd);
        assert_eq!(trace_names(macd), vec!["MACD Histogram", "MACD", "Signal"]);
        let heights: Vec<f64> = chart.panels.iter().map(|p| p.height).collect();
        assert_eq!(heights, vec![0.6, 0.2, 0.2]);
    }

    #[test]
    fn every_referenced_column_is_present_and_aligned() {
        let chart = build(ChartStyle::Candlestick, &IndicatorKind::PRESETS);
        for panel in &chart.panels {
            for trace in &panel.traces {
                for col in trace.columns() {
                    let data = chart.data.get(col).unwrap_or_else(|| panic!("missing {col}"));
                    assert_eq!(data.len(), chart.x.len());
                }
            }
        }
    }

    #[test]
    fn serialises_with_trace_tags() {
        let chart = build(ChartStyle::Candlestick, &[IndicatorKind::Rsi]);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["panels"][0]["traces"][0]["type"], "candlestick");
        assert_eq!(json["panels"][1]["kind"], "rsi");
        assert_eq!(json["panels"][1]["reference_lines"][0]["dash"], "dash");
        assert!(json["data"]["RSI"][0].is_null());
    }
}
