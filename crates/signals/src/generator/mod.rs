//! Signal generators for the analyzer.
//!
//! Price and sentiment sub-signals feed a pure fusion step that produces
//! the persisted five-level signal.

pub mod fusion;
pub mod price_signal;
pub mod sentiment_aggregate;

pub use fusion::{SignalFusionEngine, PRICE_WEIGHT, SENTIMENT_WEIGHT, STRONG_THRESHOLD};
pub use price_signal::{volume_change_percent, PriceSignalEngine, HOLD_STRENGTH, MIN_OBSERVATIONS};
pub use sentiment_aggregate::{classify_bias, SentimentAggregator, BIAS_THRESHOLD};
