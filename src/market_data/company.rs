use serde::{Deserialize, Serialize};

use super::Bar;

/// Company facts resolved once at the data-source boundary.
///
/// Every field is optional: providers omit fields freely and the dashboard
/// renders "N/A" for anything absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFacts {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub trailing_pe: Option<f64>,
    /// Fractional yield (0.005 == 0.5 %).
    #[serde(default)]
    pub dividend_yield: Option<f64>,

    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub full_time_employees: Option<u64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub long_business_summary: Option<String>,
}

impl CompanyFacts {
    /// Fill every field that is still `None` from `other`.
    pub fn merge_missing(&mut self, other: CompanyFacts) {
        macro_rules! fill {
            ($($field:ident),* $(,)?) => {
                $(
                    if self.$field.is_none() {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        fill!(
            short_name,
            long_name,
            exchange,
            currency,
            current_price,
            previous_close,
            day_high,
            day_low,
            volume,
            fifty_two_week_high,
            fifty_two_week_low,
            market_cap,
            trailing_pe,
            dividend_yield,
            sector,
            industry,
            country,
            full_time_employees,
            website,
            long_business_summary,
        );
    }

    /// Display name: short name, then long name, then the ticker itself.
    pub fn display_name<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.short_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(ticker)
    }
}

/// Everything one fetch returns for a ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub bars: Vec<Bar>,
    pub facts: CompanyFacts,
}

/// Compact quote used by the market overview and sector peer strips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCard {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
}

/// Last price against the reference close.
///
/// Price falls back to the last close and the reference close falls back to
/// the second-to-last bar.  Change is zero when no usable reference exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceMove {
    pub price: f64,
    pub previous_close: Option<f64>,
    pub change: f64,
    pub change_pct: f64,
}

impl PriceMove {
    /// `None` when neither the facts nor the bars carry a price.
    pub fn resolve(bars: &[Bar], facts: &CompanyFacts) -> Option<Self> {
        let price = facts.current_price.or(bars.last().map(|b| b.close))?;
        let previous_close = facts
            .previous_close
            .or_else(|| (bars.len() > 1).then(|| bars[bars.len() - 2].close));

        let (change, change_pct) = match previous_close {
            Some(prev) if prev != 0.0 => {
                let change = price - prev;
                (change, change / prev * 100.0)
            }
            _ => (0.0, 0.0),
        };

        Some(Self {
            price,
            previous_close,
            change,
            change_pct,
        })
    }
}

impl QuoteCard {
    /// Build a quote from a snapshot.  Returns `None` when no price is known.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Option<Self> {
        let PriceMove {
            price,
            change,
            change_pct,
            ..
        } = PriceMove::resolve(&snapshot.bars, &snapshot.facts)?;

        Some(Self {
            ticker: snapshot.ticker.clone(),
            price,
            change,
            change_pct,
        })
    }
}
