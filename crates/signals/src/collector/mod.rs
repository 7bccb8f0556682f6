//! Upstream data collectors for the scraper.
//!
//! - Quotes from Alpha Vantage `GLOBAL_QUOTE`
//! - Company news from NewsAPI
//!
//! Both clients are rate limited and never retry; a failed symbol is
//! skipped until the next cycle.

mod market_collector;
mod news_collector;

pub use market_collector::{parse_quote, AlphaVantageClient, GlobalQuote, ALPHA_VANTAGE_API_URL};
pub use news_collector::{company_name, NewsApiClient, NEWS_API_URL};
