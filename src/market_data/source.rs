// =============================================================================
// Market Data Source: boundary trait
// =============================================================================
//
// The dashboard core only consumes a completed `MarketSnapshot`.  Fetching,
// timeouts and provider quirks live behind this trait so that the HTTP layer
// can be exercised against an in-memory source in tests.
// =============================================================================

use anyhow::Result;
use futures_util::future::BoxFuture;

use super::{MarketSnapshot, QuoteCard};

/// Lookback used when only a quote (price + daily change) is needed.
pub const QUOTE_PERIOD: &str = "5d";
/// Sampling interval used for quotes.
pub const QUOTE_INTERVAL: &str = "1d";

/// A provider of historical bars and company facts.
pub trait MarketDataSource: Send + Sync {
    /// Fetch bars for `ticker` over the `period` label sampled at `interval`,
    /// together with whatever company facts the provider knows.
    ///
    /// Period and interval are opaque provider labels such as `"1y"`/`"1d"`.
    fn fetch<'a>(
        &'a self,
        ticker: &'a str,
        period: &'a str,
        interval: &'a str,
    ) -> BoxFuture<'a, Result<MarketSnapshot>>;

    /// Fetch a short daily history for `ticker` and reduce it to a quote card.
    ///
    /// Providers that can price a ticker more cheaply than a full `fetch`
    /// should override this.
    fn fetch_quote<'a>(&'a self, ticker: &'a str) -> BoxFuture<'a, Result<QuoteCard>> {
        Box::pin(async move {
            let snapshot = self.fetch(ticker, QUOTE_PERIOD, QUOTE_INTERVAL).await?;
            quote_from_snapshot(&snapshot)
        })
    }
}

/// Reduce a snapshot to a quote card, failing when it carries no price.
pub fn quote_from_snapshot(snapshot: &MarketSnapshot) -> Result<QuoteCard> {
    QuoteCard::from_snapshot(snapshot)
        .ok_or_else(|| anyhow::anyhow!("no price available for {}", snapshot.ticker))
}
