// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators shown on
// the dashboard.  The per-indicator `calculate_*` functions return compact,
// tail-aligned vectors; the engine pads them into series aligned with the bar
// sequence.

pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod sma;

pub use engine::{compute_indicators, IndicatorEntry, IndicatorSet};
pub use series::IndicatorSeries;
