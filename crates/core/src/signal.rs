//! Signal value types shared by the analyzer and the alert evaluator.
//!
//! Discrete labels map to a numeric polarity in {-1, 0, +1}; the fusion
//! engine combines polarities weighted by strength and confidence.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maps a discrete signal label to -1, 0 or +1.
pub trait Polarity {
    fn polarity(&self) -> f64;
}

/// Price-derived action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceAction {
    Buy,
    Sell,
    Hold,
}

impl PriceAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl Polarity for PriceAction {
    fn polarity(&self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
            Self::Hold => 0.0,
        }
    }
}

/// Sentiment-derived bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentBias {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentBias {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl Polarity for SentimentBias {
    fn polarity(&self) -> f64 {
        match self {
            Self::Bullish => 1.0,
            Self::Bearish => -1.0,
            Self::Neutral => 0.0,
        }
    }
}

/// Five-level output of the fusion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalSignal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl FinalSignal {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }

    /// STRONG_BUY and STRONG_SELL are the only levels that raise signal alerts.
    #[must_use]
    pub const fn is_strong(self) -> bool {
        matches!(self, Self::StrongBuy | Self::StrongSell)
    }
}

impl fmt::Display for FinalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinalSignal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "STRONG_BUY" => Ok(Self::StrongBuy),
            "BUY" => Ok(Self::Buy),
            "HOLD" => Ok(Self::Hold),
            "SELL" => Ok(Self::Sell),
            "STRONG_SELL" => Ok(Self::StrongSell),
            other => bail!("unknown final signal: {other}"),
        }
    }
}

/// Output of the price signal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSignal {
    pub symbol: String,
    pub action: PriceAction,
    /// 0.0 to 1.0
    pub strength: f64,
    /// Latest change percent; `None` when there was not enough history.
    pub price_change: Option<f64>,
    /// Percent change in volume between the two latest observations. Reporting only.
    pub volume_change: f64,
    pub latest_price: Option<Decimal>,
    pub reason: String,
}

impl PriceSignal {
    /// HOLD with zero strength, used when fewer than two observations exist.
    #[must_use]
    pub fn insufficient(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            action: PriceAction::Hold,
            strength: 0.0,
            price_change: None,
            volume_change: 0.0,
            latest_price: None,
            reason: "Insufficient data".to_string(),
        }
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.action.polarity() * self.strength
    }
}

/// Output of the sentiment aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    pub symbol: String,
    pub bias: SentimentBias,
    pub avg_sentiment: f64,
    /// Mean per-record confidence, 0 when no records matched.
    pub confidence: f64,
    pub article_count: i64,
}

impl SentimentSignal {
    #[must_use]
    pub fn neutral(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bias: SentimentBias::Neutral,
            avg_sentiment: 0.0,
            confidence: 0.0,
            article_count: 0,
        }
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.bias.polarity() * self.confidence
    }
}

/// Result of fusing a price signal with a sentiment signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedSignal {
    pub symbol: String,
    pub signal: FinalSignal,
    pub composite_score: f64,
    pub price: PriceSignal,
    pub sentiment: SentimentSignal,
    pub timestamp: DateTime<Utc>,
}
