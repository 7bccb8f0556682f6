//! Trading signal data model.

use anyhow::Result;
use chrono::{DateTime, Utc};
use fintech_monitor_core::{FinalSignal, FusedSignal};
use serde::{Deserialize, Serialize};

/// One fused signal for one symbol. The table is append-only; the current
/// state of a symbol is its newest row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradingSignalRecord {
    pub symbol: String,
    /// "STRONG_BUY", "BUY", "HOLD", "SELL" or "STRONG_SELL"
    pub signal: String,
    pub composite_score: f64,
    /// Latest change percent; NULL when price history was insufficient
    pub price_change: Option<f64>,
    /// Mean sentiment over the fusion window
    pub sentiment_score: f64,
    /// Sentiment confidence
    pub confidence: f64,
    /// Price engine reason
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl TradingSignalRecord {
    #[must_use]
    pub fn from_fused(fused: &FusedSignal) -> Self {
        Self {
            symbol: fused.symbol.clone(),
            signal: fused.signal.as_str().to_string(),
            composite_score: fused.composite_score,
            price_change: fused.price.price_change,
            sentiment_score: fused.sentiment.avg_sentiment,
            confidence: fused.sentiment.confidence,
            reason: fused.price.reason.clone(),
            timestamp: fused.timestamp,
        }
    }

    /// Parses the stored signal label.
    ///
    /// # Errors
    /// Returns an error if the row holds an unknown label.
    pub fn final_signal(&self) -> Result<FinalSignal> {
        self.signal.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fintech_monitor_core::{PriceAction, PriceSignal, SentimentBias, SentimentSignal};

    #[test]
    fn test_from_fused_copies_price_and_sentiment_fields() {
        let fused = FusedSignal {
            symbol: "MSFT".to_string(),
            signal: FinalSignal::StrongBuy,
            composite_score: 0.76,
            price: PriceSignal {
                symbol: "MSFT".to_string(),
                action: PriceAction::Buy,
                strength: 0.8,
                price_change: Some(8.0),
                volume_change: 12.5,
                latest_price: None,
                reason: "Strong upward movement: +8.00%".to_string(),
            },
            sentiment: SentimentSignal {
                symbol: "MSFT".to_string(),
                bias: SentimentBias::Bullish,
                avg_sentiment: 0.45,
                confidence: 0.7,
                article_count: 4,
            },
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        };

        let record = TradingSignalRecord::from_fused(&fused);
        assert_eq!(record.signal, "STRONG_BUY");
        assert_eq!(record.price_change, Some(8.0));
        assert_eq!(record.sentiment_score, 0.45);
        assert_eq!(record.confidence, 0.7);
        assert_eq!(record.reason, "Strong upward movement: +8.00%");
        assert_eq!(record.final_signal().unwrap(), FinalSignal::StrongBuy);
    }
}
