//! Weighted fusion of price and sentiment signals.
//!
//! ```text
//! composite = 0.6 * polarity(price) * strength + 0.4 * polarity(sentiment) * confidence
//! ```
//!
//! | composite          | signal      |
//! |--------------------|-------------|
//! | > 0.3              | STRONG_BUY  |
//! | (0, 0.3]           | BUY         |
//! | = 0                | HOLD        |
//! | [-0.3, 0)          | SELL        |
//! | < -0.3             | STRONG_SELL |

use chrono::{DateTime, Utc};
use fintech_monitor_core::{FinalSignal, FusedSignal, PriceSignal, SentimentSignal};

pub const PRICE_WEIGHT: f64 = 0.6;
pub const SENTIMENT_WEIGHT: f64 = 0.4;
pub const STRONG_THRESHOLD: f64 = 0.3;

/// Pure fusion of the two sub-signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalFusionEngine;

impl SignalFusionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn composite_score(&self, price: &PriceSignal, sentiment: &SentimentSignal) -> f64 {
        PRICE_WEIGHT * price.score() + SENTIMENT_WEIGHT * sentiment.score()
    }

    #[must_use]
    pub fn classify(&self, composite: f64) -> FinalSignal {
        if composite > STRONG_THRESHOLD {
            FinalSignal::StrongBuy
        } else if composite > 0.0 {
            FinalSignal::Buy
        } else if composite < -STRONG_THRESHOLD {
            FinalSignal::StrongSell
        } else if composite < 0.0 {
            FinalSignal::Sell
        } else {
            FinalSignal::Hold
        }
    }

    #[must_use]
    pub fn fuse(
        &self,
        price: PriceSignal,
        sentiment: SentimentSignal,
        timestamp: DateTime<Utc>,
    ) -> FusedSignal {
        let composite_score = self.composite_score(&price, &sentiment);
        FusedSignal {
            symbol: price.symbol.clone(),
            signal: self.classify(composite_score),
            composite_score,
            price,
            sentiment,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fintech_monitor_core::{PriceAction, SentimentBias};

    fn price(action: PriceAction, strength: f64) -> PriceSignal {
        PriceSignal {
            symbol: "TSLA".to_string(),
            action,
            strength,
            price_change: Some(0.0),
            volume_change: 0.0,
            latest_price: None,
            reason: String::new(),
        }
    }

    fn sentiment(bias: SentimentBias, confidence: f64) -> SentimentSignal {
        SentimentSignal {
            symbol: "TSLA".to_string(),
            bias,
            avg_sentiment: 0.0,
            confidence,
            article_count: 3,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_agreement_is_strong_buy() {
        let fused = SignalFusionEngine::new().fuse(
            price(PriceAction::Buy, 1.0),
            sentiment(SentimentBias::Bullish, 1.0),
            at(),
        );
        assert!((fused.composite_score - 1.0).abs() < 1e-12);
        assert_eq!(fused.signal, FinalSignal::StrongBuy);
        assert_eq!(fused.symbol, "TSLA");
    }

    #[test]
    fn test_fusion_is_reproducible() {
        let engine = SignalFusionEngine::new();
        let a = engine.fuse(
            price(PriceAction::Sell, 0.7),
            sentiment(SentimentBias::Bullish, 0.5),
            at(),
        );
        let b = engine.fuse(
            price(PriceAction::Sell, 0.7),
            sentiment(SentimentBias::Bullish, 0.5),
            at(),
        );
        assert_eq!(a, b);
        // 0.6 * -0.7 + 0.4 * 0.5 = -0.22
        assert!((a.composite_score + 0.22).abs() < 1e-12);
        assert_eq!(a.signal, FinalSignal::Sell);
    }

    #[test]
    fn test_hold_and_neutral_is_hold() {
        let fused = SignalFusionEngine::new().fuse(
            price(PriceAction::Hold, 0.3),
            sentiment(SentimentBias::Neutral, 0.8),
            at(),
        );
        assert_eq!(fused.composite_score, 0.0);
        assert_eq!(fused.signal, FinalSignal::Hold);
    }

    #[test]
    fn test_bucket_boundaries() {
        let engine = SignalFusionEngine::new();
        assert_eq!(engine.classify(0.31), FinalSignal::StrongBuy);
        assert_eq!(engine.classify(0.3), FinalSignal::Buy);
        assert_eq!(engine.classify(0.0001), FinalSignal::Buy);
        assert_eq!(engine.classify(0.0), FinalSignal::Hold);
        assert_eq!(engine.classify(-0.0001), FinalSignal::Sell);
        assert_eq!(engine.classify(-0.3), FinalSignal::Sell);
        assert_eq!(engine.classify(-0.31), FinalSignal::StrongSell);
    }

    #[test]
    fn test_price_only_strong_sell() {
        // 0.6 * -1.0 = -0.6
        let fused = SignalFusionEngine::new().fuse(
            price(PriceAction::Sell, 1.0),
            sentiment(SentimentBias::Neutral, 0.0),
            at(),
        );
        assert_eq!(fused.signal, FinalSignal::StrongSell);
    }
}
