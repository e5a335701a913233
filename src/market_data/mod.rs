pub mod bar;
pub mod company;
pub mod source;
pub mod yahoo;

// Re-export the core data types for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{validate_bars, Bar};
pub use company::{CompanyFacts, MarketSnapshot, PriceMove, QuoteCard};
pub use source::MarketDataSource;
pub use yahoo::YahooClient;
