use crate::error::MonitorError;
use crate::sentiment::SentimentAnalysis;
use async_trait::async_trait;

/// Text classifier that returns a structured sentiment record.
///
/// Implementations may fail; callers resolve failures through a fallback
/// instead of surfacing them.
#[async_trait]
pub trait SentimentCapability: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentAnalysis, MonitorError>;
    fn name(&self) -> &str;
}
