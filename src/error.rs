// =============================================================================
// Dashboard Errors
// =============================================================================
//
// Typed failures surfaced by the indicator engine, the chart assembler and the
// request boundary.  The pure core never logs; callers decide how to report.
// =============================================================================

/// Convenience alias used by the pure core.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Every failure the dashboard core can report to its caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// A series has no defined value because the bar history is shorter than
    /// the indicator's lookback window.
    #[error("insufficient data for {indicator}: need {required} bars, have {available}")]
    InsufficientData {
        indicator: String,
        required: usize,
        available: usize,
    },

    /// The bar sequence is empty, so there is nothing to compute or chart.
    #[error("bar sequence is empty")]
    EmptyData,

    /// A requested indicator label is not part of the supported set.
    #[error("unknown indicator: '{0}'")]
    UnknownIndicator(String),

    /// A requested chart style label is not one of candlestick, line, ohlc.
    #[error("unknown chart style: '{0}'")]
    UnknownChartStyle(String),

    /// A bar carries a missing (non-finite) field or inconsistent prices.
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    /// The request itself is unusable (e.g. blank ticker).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An indicator set was computed over a different bar history than the
    /// one being charted.
    #[error("indicator set covers {actual} bars but {expected} bars were supplied")]
    MisalignedSeries { expected: usize, actual: usize },

    /// The market-data provider failed.
    #[error("market data source failed: {0}")]
    DataSource(String),
}
