use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar as delivered by the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Check the bar on its own: every field finite, `low <= high`, volume
    /// not negative.  A NaN field is how a missing provider value arrives.
    fn check(&self) -> std::result::Result<(), String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("missing or non-finite {name}"));
            }
        }
        if self.low > self.high {
            return Err(format!("low {} is above high {}", self.low, self.high));
        }
        if self.volume < 0.0 {
            return Err(format!("negative volume {}", self.volume));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Fail fast on the first malformed bar.
///
/// NaNs would otherwise leak into every rolling window that touches them, so
/// the whole sequence is rejected before any indicator runs.  Timestamps must
/// be strictly ascending (no duplicates).
pub fn validate_bars(bars: &[Bar]) -> Result<()> {
    for (index, bar) in bars.iter().enumerate() {
        bar.check()
            .map_err(|reason| DashboardError::MalformedBar { index, reason })?;

        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(DashboardError::MalformedBar {
                index,
                reason: format!(
                    "timestamp {} does not follow {}",
                    bar.timestamp,
                    bars[index - 1].timestamp
                ),
            });
        }
    }
    Ok(())
}

/// Close prices in bar order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
