//! Signal generation for the fintech monitoring pipeline.
//!
//! - Collectors for quotes (Alpha Vantage) and company news (NewsAPI)
//! - Article sentiment through a classifier with a keyword fallback
//! - Price and sentiment sub-signals fused into a five-level signal
//! - The scraper and analyzer cycle runners

pub mod collector;
pub mod common;
pub mod generator;
pub mod sentiment;
pub mod service;

// Re-export signal generators for convenience
pub use generator::{
    classify_bias, volume_change_percent, PriceSignalEngine, SentimentAggregator,
    SignalFusionEngine, BIAS_THRESHOLD, HOLD_STRENGTH, MIN_OBSERVATIONS, PRICE_WEIGHT,
    SENTIMENT_WEIGHT, STRONG_THRESHOLD,
};

// Re-export collectors for convenience
pub use collector::{company_name, AlphaVantageClient, NewsApiClient};

pub use sentiment::{keyword_sentiment, GeminiClassifier, SentimentSource};

pub use service::{AnalysisReport, AnalyzerService, ScrapeReport, ScraperService};
