// =============================================================================
// Application State
// =============================================================================
//
// Shared by every request handler through `Arc<AppState>`.  Nothing in here
// mutates after startup: the config is fixed and the data source manages its
// own connection pool.
// =============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::DashboardConfig;
use crate::market_data::MarketDataSource;

pub struct AppState {
    pub config: DashboardConfig,
    pub source: Arc<dyn MarketDataSource>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: DashboardConfig, source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            config,
            source,
            started_at: Utc::now(),
        }
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
