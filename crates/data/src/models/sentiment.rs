//! Sentiment analysis data model.

use chrono::{DateTime, Utc};
use fintech_monitor_core::{MarketImpact, SentimentAnalysis, SentimentLabel};
use serde::{Deserialize, Serialize};

/// Classification of one article. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SentimentRecord {
    pub article_id: i64,
    pub symbol: String,
    #[sqlx(rename = "sentiment_score")]
    pub score: f64,
    /// "positive", "negative" or "neutral"
    #[sqlx(rename = "sentiment_label")]
    pub label: String,
    pub confidence: f64,
    pub key_points: Vec<String>,
    /// "bullish", "bearish" or "neutral"
    pub market_impact: String,
    pub summary: String,
    pub analyzed_at: DateTime<Utc>,
}

impl SentimentRecord {
    pub fn from_analysis(
        article_id: i64,
        symbol: impl Into<String>,
        analysis: SentimentAnalysis,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            article_id,
            symbol: symbol.into(),
            score: analysis.score,
            label: analysis.label.as_str().to_string(),
            confidence: analysis.confidence,
            key_points: analysis.key_points,
            market_impact: analysis.market_impact.as_str().to_string(),
            summary: analysis.summary,
            analyzed_at,
        }
    }

    #[must_use]
    pub fn parsed_label(&self) -> SentimentLabel {
        SentimentLabel::parse_lenient(&self.label)
    }

    #[must_use]
    pub fn parsed_market_impact(&self) -> MarketImpact {
        MarketImpact::parse_lenient(&self.market_impact)
    }
}

/// Per-symbol sentiment aggregate over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SentimentSummary {
    pub symbol: String,
    pub avg_sentiment: f64,
    pub article_count: i64,
    pub avg_confidence: f64,
}

impl SentimentSummary {
    /// Aggregates records that all belong to `symbol`. Returns `None` when empty.
    #[must_use]
    pub fn from_records(symbol: &str, records: &[SentimentRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        Some(Self {
            symbol: symbol.to_string(),
            avg_sentiment: records.iter().map(|r| r.score).sum::<f64>() / n,
            article_count: records.len() as i64,
            avg_confidence: records.iter().map(|r| r.confidence).sum::<f64>() / n,
        })
    }
}
