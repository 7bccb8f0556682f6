//! Sentiment source: classifier first, keyword heuristic on any failure.

use std::sync::Arc;

use fintech_monitor_core::{SentimentAnalysis, SentimentCapability};
use tracing::{error, warn};

use super::fallback::keyword_sentiment;

/// Never fails. A missing, erroring, or slow classifier resolves to the
/// keyword heuristic.
#[derive(Clone, Default)]
pub struct SentimentSource {
    capability: Option<Arc<dyn SentimentCapability>>,
}

impl SentimentSource {
    #[must_use]
    pub fn new(capability: Option<Arc<dyn SentimentCapability>>) -> Self {
        Self { capability }
    }

    /// A source with no classifier; every call uses the heuristic.
    #[must_use]
    pub fn heuristic_only() -> Self {
        Self { capability: None }
    }

    #[must_use]
    pub fn has_capability(&self) -> bool {
        self.capability.is_some()
    }

    pub async fn analyze(&self, text: &str) -> SentimentAnalysis {
        let Some(capability) = &self.capability else {
            warn!("Sentiment classifier not available, using fallback");
            return keyword_sentiment(text);
        };

        match capability.classify(text).await {
            Ok(analysis) => analysis.clamped(),
            Err(e) => {
                error!(classifier = capability.name(), "Sentiment analysis error: {}", e);
                keyword_sentiment(text)
            }
        }
    }
}
