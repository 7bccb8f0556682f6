//! Keyword heuristic used when the classifier is unavailable.
//!
//! Each list word found anywhere in the lowercased text counts once.

use fintech_monitor_core::{MarketImpact, SentimentAnalysis, SentimentLabel};

pub const POSITIVE_WORDS: [&str; 9] = [
    "gain", "profit", "up", "increase", "growth", "surge", "rally", "bullish", "positive",
];

pub const NEGATIVE_WORDS: [&str; 8] = [
    "loss", "decline", "down", "decrease", "fall", "drop", "bearish", "negative",
];

pub const FALLBACK_CONFIDENCE: f64 = 0.5;

#[must_use]
pub fn keyword_sentiment(text: &str) -> SentimentAnalysis {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

    let total = positive + negative;
    let score = if total == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / total as f64
    };

    SentimentAnalysis {
        score,
        label: SentimentLabel::from_score(score),
        confidence: FALLBACK_CONFIDENCE,
        key_points: vec!["Fallback analysis used".to_string()],
        market_impact: MarketImpact::Neutral,
        summary: "Basic sentiment analysis performed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_polarity_words_is_neutral_half_confidence() {
        let analysis = keyword_sentiment("Company schedules annual meeting");
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.label, SentimentLabel::Neutral);
        assert_eq!(analysis.confidence, 0.5);
        assert_eq!(analysis.market_impact, MarketImpact::Neutral);
        assert_eq!(analysis.key_points, vec!["Fallback analysis used"]);
    }

    #[test]
    fn test_positive_text() {
        let analysis = keyword_sentiment("Shares SURGE as profit growth beats forecasts");
        assert_eq!(analysis.score, 1.0);
        assert_eq!(analysis.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_mixed_text() {
        // positive: gain, up; negative: loss
        let analysis = keyword_sentiment("Early gain gives way to loss, stock up slightly");
        assert!((analysis.score - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(analysis.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_negative_text() {
        let analysis = keyword_sentiment("Bearish outlook after sales decline");
        assert_eq!(analysis.score, -1.0);
        assert_eq!(analysis.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_repeated_word_counts_once() {
        let analysis = keyword_sentiment("drop drop drop but rally");
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.label, SentimentLabel::Neutral);
    }
}
