//! Structured sentiment classification result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Lenient parse; anything unrecognised is neutral.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }

    /// Label for a score using the +/-0.2 bands.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.2 {
            Self::Positive
        } else if score < -0.2 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketImpact {
    Bullish,
    Bearish,
    Neutral,
}

impl MarketImpact {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }

    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Self::Bullish,
            "bearish" => Self::Bearish,
            _ => Self::Neutral,
        }
    }
}

/// Classification of a single piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    /// -1.0 to 1.0
    pub score: f64,
    pub label: SentimentLabel,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub key_points: Vec<String>,
    pub market_impact: MarketImpact,
    pub summary: String,
}

impl SentimentAnalysis {
    /// Clamps score and confidence into range. NaN becomes 0.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.score = if self.score.is_nan() {
            0.0
        } else {
            self.score.clamp(-1.0, 1.0)
        };
        self.confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_bands() {
        assert_eq!(SentimentLabel::from_score(0.21), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.2), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.2), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.5), SentimentLabel::Negative);
    }

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(SentimentLabel::parse_lenient(" Positive "), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse_lenient("mixed"), SentimentLabel::Neutral);
        assert_eq!(MarketImpact::parse_lenient("BEARISH"), MarketImpact::Bearish);
        assert_eq!(MarketImpact::parse_lenient(""), MarketImpact::Neutral);
    }

    #[test]
    fn test_clamped() {
        let analysis = SentimentAnalysis {
            score: 1.7,
            label: SentimentLabel::Positive,
            confidence: f64::NAN,
            key_points: vec![],
            market_impact: MarketImpact::Bullish,
            summary: String::new(),
        }
        .clamped();
        assert_eq!(analysis.score, 1.0);
        assert_eq!(analysis.confidence, 0.0);
    }
}
