//! Data models for the monitoring pipeline.
//!
//! Prices use `rust_decimal::Decimal`; scores and percentages are `f64`.
//! Row types derive `sqlx::FromRow`.

pub mod alert;
pub mod market;
pub mod news;
pub mod sentiment;
pub mod trading_signal;

pub use alert::{Alert, AlertDetails, AlertRow, AlertType, Severity};
pub use market::PriceObservation;
pub use news::{NewArticle, NewsArticle};
pub use sentiment::{SentimentRecord, SentimentSummary};
pub use trading_signal::TradingSignalRecord;
