//! Sentiment aggregation over a lookback window.
//!
//! The analyzer aggregates over 24 hours before fusion; the alert evaluator
//! uses a 6 hour window through the store-side summary.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use fintech_monitor_core::{SentimentBias, SentimentSignal};
use fintech_monitor_data::{SentimentRecord, SentimentStore, SentimentSummary};

/// Mean score above which sentiment is bullish (and below its negation, bearish).
pub const BIAS_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct SentimentAggregator {
    window: Duration,
}

impl SentimentAggregator {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    #[must_use]
    pub fn with_hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours))
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Aggregates the records that fall inside the window ending at `now`.
    #[must_use]
    pub fn aggregate(
        &self,
        symbol: &str,
        records: &[SentimentRecord],
        now: DateTime<Utc>,
    ) -> SentimentSignal {
        let since = now - self.window;
        let in_window: Vec<SentimentRecord> = records
            .iter()
            .filter(|r| r.symbol == symbol && r.analyzed_at > since)
            .cloned()
            .collect();

        match SentimentSummary::from_records(symbol, &in_window) {
            Some(summary) => Self::from_summary(&summary),
            None => SentimentSignal::neutral(symbol),
        }
    }

    /// Converts a precomputed summary into a signal.
    #[must_use]
    pub fn from_summary(summary: &SentimentSummary) -> SentimentSignal {
        if summary.article_count == 0 {
            return SentimentSignal::neutral(&summary.symbol);
        }
        SentimentSignal {
            symbol: summary.symbol.clone(),
            bias: classify_bias(summary.avg_sentiment),
            avg_sentiment: summary.avg_sentiment,
            confidence: summary.avg_confidence,
            article_count: summary.article_count,
        }
    }

    /// Loads the window from the store and aggregates it.
    ///
    /// # Errors
    /// Returns an error if the store query fails.
    pub async fn load<S: SentimentStore + ?Sized>(
        &self,
        store: &S,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<SentimentSignal> {
        let records = store.sentiment_since(symbol, now - self.window).await?;
        Ok(self.aggregate(symbol, &records, now))
    }
}

#[must_use]
pub fn classify_bias(mean: f64) -> SentimentBias {
    if mean > BIAS_THRESHOLD {
        SentimentBias::Bullish
    } else if mean < -BIAS_THRESHOLD {
        SentimentBias::Bearish
    } else {
        SentimentBias::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fintech_monitor_data::MemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(article_id: i64, score: f64, confidence: f64, hours_ago: i64) -> SentimentRecord {
        SentimentRecord {
            article_id,
            symbol: "GOOGL".to_string(),
            score,
            label: "neutral".to_string(),
            confidence,
            key_points: vec![],
            market_impact: "neutral".to_string(),
            summary: String::new(),
            analyzed_at: now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_no_records_is_neutral_zero() {
        let signal = SentimentAggregator::with_hours(24).aggregate("GOOGL", &[], now());
        assert_eq!(signal.bias, SentimentBias::Neutral);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.article_count, 0);
    }

    #[test]
    fn test_records_outside_window_are_ignored() {
        let records = [record(1, 0.9, 0.9, 30)];
        let signal = SentimentAggregator::with_hours(24).aggregate("GOOGL", &records, now());
        assert_eq!(signal.article_count, 0);
        assert_eq!(signal.bias, SentimentBias::Neutral);
    }

    #[test]
    fn test_bias_bands_and_confidence_mean() {
        let aggregator = SentimentAggregator::with_hours(24);

        let bullish = aggregator.aggregate(
            "GOOGL",
            &[record(1, 0.5, 0.8, 1), record(2, 0.3, 0.6, 2)],
            now(),
        );
        assert_eq!(bullish.bias, SentimentBias::Bullish);
        assert!((bullish.avg_sentiment - 0.4).abs() < 1e-12);
        assert!((bullish.confidence - 0.7).abs() < 1e-12);
        assert_eq!(bullish.article_count, 2);

        let bearish = aggregator.aggregate("GOOGL", &[record(1, -0.31, 0.5, 1)], now());
        assert_eq!(bearish.bias, SentimentBias::Bearish);

        let neutral = aggregator.aggregate("GOOGL", &[record(1, 0.3, 0.5, 1)], now());
        assert_eq!(neutral.bias, SentimentBias::Neutral);
    }

    #[tokio::test]
    async fn test_load_uses_store_window() {
        let store = MemoryStore::new();
        for r in [record(1, 0.8, 0.9, 2), record(2, -0.9, 0.9, 10)] {
            store.insert_sentiment(&r).await.unwrap();
        }

        let six_hour = SentimentAggregator::with_hours(6)
            .load(&store, "GOOGL", now())
            .await
            .unwrap();
        assert_eq!(six_hour.article_count, 1);
        assert_eq!(six_hour.bias, SentimentBias::Bullish);

        let day = SentimentAggregator::with_hours(24)
            .load(&store, "GOOGL", now())
            .await
            .unwrap();
        assert_eq!(day.article_count, 2);
        assert_eq!(day.bias, SentimentBias::Neutral);
    }
}
