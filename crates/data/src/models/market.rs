//! Market quote data model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price quote for one symbol at one point in time.
///
/// Immutable once recorded. Readers order by timestamp, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceObservation {
    pub symbol: String,
    pub price: Decimal,
    /// Absolute change since previous close
    pub change_amount: Decimal,
    /// Percent change since previous close, e.g. 6.0 for +6%
    pub change_percent: f64,
    pub volume: i64,
    pub timestamp: DateTime<Utc>,
}

impl PriceObservation {
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change_percent: f64,
        volume: i64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change_amount: Decimal::ZERO,
            change_percent,
            volume,
            timestamp,
        }
    }

    #[must_use]
    pub fn with_change_amount(mut self, change_amount: Decimal) -> Self {
        self.change_amount = change_amount;
        self
    }
}
