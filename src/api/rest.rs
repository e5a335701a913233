// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are read-only:
//
//   GET /api/v1/health     liveness + server time
//   GET /api/v1/options    selector contents and request defaults
//   GET /api/v1/dashboard  full dashboard for one ticker
//   GET /api/v1/overview   quote cards for the popular tickers
//
// CORS is configured permissively; the dashboard front end is served from a
// different origin during development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::dashboard::{build_dashboard, Dashboard, DashboardQuery, DashboardRequest};
use crate::error::DashboardError;
use crate::market_data::{MarketDataSource, QuoteCard};
use crate::types::{ChartStyle, IndicatorKind};

/// Error body returned by every handler: `{"error": message}`.
pub type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/options", get(options))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/overview", get(overview))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::UnknownIndicator(_)
        | DashboardError::UnknownChartStyle(_)
        | DashboardError::BadRequest(_) => StatusCode::BAD_REQUEST,
        DashboardError::EmptyData => StatusCode::NOT_FOUND,
        DashboardError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::MalformedBar { .. } | DashboardError::DataSource(_) => {
            StatusCode::BAD_GATEWAY
        }
        DashboardError::MisalignedSeries { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: &DashboardError, ticker: &str) -> ApiError {
    let message = match err {
        DashboardError::EmptyData => format!("No data available for {ticker}"),
        other => other.to_string(),
    };
    (status_for(err), Json(json!({ "error": message })))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: i64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Options
// =============================================================================

async fn options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cfg = &state.config;
    Json(json!({
        "periods": cfg.periods,
        "chart_styles": ChartStyle::ALL,
        "indicators": IndicatorKind::PRESETS,
        "popular_tickers": cfg.popular_tickers,
        "defaults": {
            "ticker": cfg.default_ticker,
            "period": cfg.default_period,
            "interval": cfg.default_interval,
            "style": cfg.default_style,
            "indicators": cfg.default_indicators,
        },
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Serialize)]
struct DashboardResponse {
    request_id: String,
    #[serde(flatten)]
    dashboard: Dashboard,
    peers: Vec<QuoteCard>,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("dashboard", request_id = %request_id);

    async move {
        let request = DashboardRequest::from_query(query, &state.config).map_err(|e| {
            warn!(error = %e, "rejected dashboard request");
            api_error(&e, "")
        })?;
        let ticker = request.ticker.as_str();

        let snapshot = state
            .source
            .fetch(ticker, &request.period, &request.interval)
            .await
            .map_err(|e| {
                warn!(ticker, error = %e, "market data fetch failed");
                api_error(&DashboardError::DataSource(format!("{e:#}")), ticker)
            })?;

        let dashboard = build_dashboard(&snapshot, &request, state.config.peer_limit)
            .map_err(|e| {
                warn!(ticker, error = %e, "dashboard build failed");
                api_error(&e, ticker)
            })?;

        let peers = quote_all(&state, &dashboard.peer_tickers).await;

        info!(
            ticker,
            bars = snapshot.bars.len(),
            indicators = request.indicators.len(),
            peers = peers.len(),
            "dashboard served"
        );

        Ok::<_, ApiError>(Json(DashboardResponse {
            request_id,
            dashboard,
            peers,
        }))
    }
    .instrument(span)
    .await
}

// =============================================================================
// Market overview
// =============================================================================

#[derive(Serialize)]
struct OverviewResponse {
    quotes: Vec<QuoteCard>,
}

async fn overview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let quotes = quote_all(&state, &state.config.popular_tickers).await;
    Json(OverviewResponse { quotes })
}

/// Quote every ticker concurrently, dropping (and logging) failures.
async fn quote_all(state: &AppState, tickers: &[String]) -> Vec<QuoteCard> {
    let source = state.source.as_ref();
    let results = join_all(tickers.iter().map(|t| source.fetch_quote(t))).await;

    tickers
        .iter()
        .zip(results)
        .filter_map(|(ticker, result)| match result {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "quote unavailable, skipping");
                None
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use futures_util::future::BoxFuture;
    use tower::ServiceExt;

    use crate::config::DashboardConfig;
    use crate::market_data::bar::test_support::bars_from_closes;
    use crate::market_data::{CompanyFacts, MarketDataSource, MarketSnapshot, QuoteCard};

    /// In-memory source keyed by ticker; unknown tickers fail.
    struct FixtureSource {
        snapshots: HashMap<String, MarketSnapshot>,
    }

    impl MarketDataSource for FixtureSource {
        fn fetch<'a>(
            &'a self,
            ticker: &'a str,
            _period: &'a str,
            _interval: &'a str,
        ) -> BoxFuture<'a, anyhow::Result<MarketSnapshot>> {
            Box::pin(async move {
                self.snapshots
                    .get(ticker)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("no fixture for {ticker}"))
            })
        }
    }

    fn fixture(ticker: &str, n: usize, sector: Option<&str>) -> MarketSnapshot {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.25).sin() * 6.0).collect();
        MarketSnapshot {
            ticker: ticker.to_string(),
            bars: bars_from_closes(&closes),
            facts: CompanyFacts {
                short_name: Some(format!("{ticker} Corp")),
                sector: sector.map(str::to_string),
                ..Default::default()
            },
        }
    }

    fn app() -> Router {
        let mut snapshots = HashMap::new();
        snapshots.insert("AAPL".to_string(), fixture("AAPL", 80, Some("Technology")));
        snapshots.insert("MSFT".to_string(), fixture("MSFT", 10, None));
        snapshots.insert("NVDA".to_string(), fixture("NVDA", 10, None));
        snapshots.insert("EMPTY".to_string(), fixture("EMPTY", 0, None));

        let mut bad = fixture("BAD", 5, None);
        bad.bars[2].close = f64::NAN;
        snapshots.insert("BAD".to_string(), bad);

        let config = DashboardConfig {
            popular_tickers: vec!["AAPL".into(), "MSFT".into(), "ZZZZ".into()],
            ..Default::default()
        };
        router(Arc::new(AppState::new(config, Arc::new(FixtureSource { snapshots }))))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // ---- health & options ----

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn options_list_presets_and_defaults() {
        let (status, body) = get_json("/api/v1/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indicators"][0], "SMA20");
        assert_eq!(body["indicators"][5], "BB");
        assert_eq!(body["chart_styles"][0], "candlestick");
        assert_eq!(body["defaults"]["ticker"], "AAPL");
        assert_eq!(body["defaults"]["indicators"][1], "EMA20");
    }

    // ---- dashboard ----

    #[tokio::test]
    async fn dashboard_happy_path() {
        let (status, body) =
            get_json("/api/v1/dashboard?ticker=aapl&indicators=SMA20,RSI&style=line").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["request_id"].is_string());
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["company"]["name"], "AAPL Corp");
        assert_eq!(body["metrics"].as_array().unwrap().len(), 8);
        assert_eq!(body["chart"]["panels"][1]["kind"], "rsi");
        assert_eq!(body["chart"]["panels"][0]["traces"][0]["type"], "line");

        // Technology peers minus AAPL; only MSFT and NVDA have fixtures.
        let peers: Vec<&str> = body["peers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["ticker"].as_str().unwrap())
            .collect();
        assert_eq!(peers, vec!["MSFT", "NVDA"]);
    }

    #[tokio::test]
    async fn unknown_indicator_is_400() {
        let (status, body) = get_json("/api/v1/dashboard?ticker=AAPL&indicators=FOO").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("FOO"));
    }

    #[tokio::test]
    async fn blank_ticker_is_400() {
        let (status, _) = get_json("/api/v1/dashboard?ticker=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ticker_with_path_characters_is_400() {
        let (status, body) =
            get_json("/api/v1/dashboard?ticker=aapl%2F..%2F..%2Fv7%2Fx%3Fcrumb%3D1%23").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid ticker"));
    }

    #[tokio::test]
    async fn empty_history_is_404() {
        let (status, body) = get_json("/api/v1/dashboard?ticker=empty").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No data available for EMPTY");
    }

    #[tokio::test]
    async fn malformed_bars_are_502() {
        let (status, body) = get_json("/api/v1/dashboard?ticker=BAD").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("index 2"));
    }

    #[tokio::test]
    async fn provider_failure_is_502() {
        let (status, _) = get_json("/api/v1/dashboard?ticker=ZZZZ").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    // ---- overview ----

    #[tokio::test]
    async fn overview_skips_failed_tickers() {
        let (status, body) = get_json("/api/v1/overview").await;
        assert_eq!(status, StatusCode::OK);
        let quotes = body["quotes"].as_array().unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0]["ticker"], "AAPL");
        assert_eq!(quotes[1]["ticker"], "MSFT");
    }

    /// Prices quotes directly and has no bar history at all.
    struct QuoteOnlySource;

    impl MarketDataSource for QuoteOnlySource {
        fn fetch<'a>(
            &'a self,
            ticker: &'a str,
            _period: &'a str,
            _interval: &'a str,
        ) -> BoxFuture<'a, anyhow::Result<MarketSnapshot>> {
            Box::pin(async move { Err::<MarketSnapshot, _>(anyhow::anyhow!("no history for {ticker}")) })
        }

        fn fetch_quote<'a>(&'a self, ticker: &'a str) -> BoxFuture<'a, anyhow::Result<QuoteCard>> {
            Box::pin(async move {
                Ok(QuoteCard {
                    ticker: ticker.to_string(),
                    price: 10.0,
                    change: 0.5,
                    change_pct: 5.0,
                })
            })
        }
    }

    #[tokio::test]
    async fn overview_uses_the_source_quote_path() {
        let config = DashboardConfig {
            popular_tickers: vec!["AAPL".into(), "MSFT".into()],
            ..Default::default()
        };
        let app = router(Arc::new(AppState::new(config, Arc::new(QuoteOnlySource))));
        let resp = app
            .oneshot(Request::builder().uri("/api/v1/overview").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let quotes = body["quotes"].as_array().unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1]["ticker"], "MSFT");
        assert_eq!(quotes[1]["change_pct"], 5.0);
    }

    #[test]
    fn misaligned_series_maps_to_500() {
        let err = DashboardError::MisalignedSeries { expected: 8, actual: 10 };
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn insufficient_data_maps_to_422() {
        let err = DashboardError::InsufficientData {
            indicator: "SMA200".into(),
            required: 200,
            available: 50,
        };
        assert_eq!(status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
