// =============================================================================
// Stock Dashboard: library root
// =============================================================================
//
// Pure core (indicators, chart, metrics, dashboard) plus the service layer
// (market data adapter, config, HTTP API).  The binary in `main.rs` only wires
// these together.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod metrics;
pub mod types;

pub use error::{DashboardError, Result};
