// =============================================================================
// Chart Description
// =============================================================================
//
// A declarative, renderer-agnostic chart: shared x values, a table of named
// data columns, and panels of traces that reference those columns by name.
// The presentation layer maps this one-to-one onto its plotting library.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Column names for the raw bar fields.
pub const COL_OPEN: &str = "open";
pub const COL_HIGH: &str = "high";
pub const COL_LOW: &str = "low";
pub const COL_CLOSE: &str = "close";
pub const COL_VOLUME: &str = "volume";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    /// Bar timestamps shared by every panel.
    pub x: Vec<DateTime<Utc>>,
    /// Every column referenced by a trace, aligned with `x`.
    pub data: BTreeMap<String, Vec<Option<f64>>>,
    /// Price panel first, then the secondary panel, then optional MACD.
    pub panels: Vec<Panel>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn panel(&self, kind: PanelKind) -> Option<&Panel> {
        self.panels.iter().find(|p| p.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Price,
    Volume,
    Rsi,
    Macd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub kind: PanelKind,
    /// Fraction of the figure height.
    pub height: f64,
    pub y_axis: YAxis,
    pub traces: Vec<Trace>,
    pub reference_lines: Vec<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub title: String,
    /// Fixed range; `None` means auto-scale.
    pub range: Option<[f64; 2]>,
}

/// Horizontal line across a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub color: &'static str,
    pub width: f64,
    pub dash: Dash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dash,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
}

/// Area shading between this trace and the previous one in the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub mode: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        name: String,
        open: String,
        high: String,
        low: String,
        close: String,
        increasing_color: &'static str,
        decreasing_color: &'static str,
    },
    Ohlc {
        name: String,
        open: String,
        high: String,
        low: String,
        close: String,
        increasing_color: &'static str,
        decreasing_color: &'static str,
    },
    Bar {
        name: String,
        y: String,
        color: &'static str,
    },
    Line {
        name: String,
        y: String,
        line: LineStyle,
        fill: Option<Fill>,
        hover: bool,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Self::Candlestick { name, .. }
            | Self::Ohlc { name, .. }
            | Self::Bar { name, .. }
            | Self::Line { name, .. } => name,
        }
    }

    /// Names of the data columns this trace reads.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Candlestick { open, high, low, close, .. }
            | Self::Ohlc { open, high, low, close, .. } => {
                vec![open.as_str(), high.as_str(), low.as_str(), close.as_str()]
            }
            Self::Bar { y, .. } | Self::Line { y, .. } => vec![y.as_str()],
        }
    }
}

/// Figure-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub template: &'static str,
    pub height: u32,
    pub hover_mode: &'static str,
    pub range_slider: bool,
    pub shared_x_axes: bool,
    pub vertical_spacing: f64,
    pub legend_orientation: &'static str,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            template: "plotly_dark",
            height: 600,
            hover_mode: "x unified",
            range_slider: false,
            shared_x_axes: true,
            vertical_spacing: 0.1,
            legend_orientation: "h",
        }
    }
}
