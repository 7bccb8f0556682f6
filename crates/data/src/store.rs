//! Storage seams used by the analyzer, scraper and alert services.
//!
//! [`crate::Repositories`] implements every trait against Postgres and
//! [`crate::MemoryStore`] implements them in process.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Alert, NewArticle, NewsArticle, PriceObservation, SentimentRecord, SentimentSummary,
    TradingSignalRecord,
};

#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Verifies the store is reachable, reconnecting if needed.
    ///
    /// # Errors
    /// Returns [`fintech_monitor_core::MonitorError::Connectivity`] when it is not.
    async fn ensure_connected(&self) -> Result<()>;
}

#[async_trait]
pub trait MarketDataStore: Send + Sync {
    async fn insert_observation(&self, observation: &PriceObservation) -> Result<()>;

    /// Newest-first observations for one symbol.
    async fn recent_observations(&self, symbol: &str, limit: i64)
        -> Result<Vec<PriceObservation>>;

    /// The newest observation of every symbol.
    async fn latest_observations(&self) -> Result<Vec<PriceObservation>>;
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Returns false if an article with the same URL already exists.
    async fn insert_article(&self, article: &NewArticle) -> Result<bool>;

    /// Articles fetched after `since` that have no sentiment record, newest first.
    async fn unanalyzed_articles(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<NewsArticle>>;

    async fn recent_articles(&self, symbol: &str, limit: i64) -> Result<Vec<NewsArticle>>;
}

#[async_trait]
pub trait SentimentStore: Send + Sync {
    async fn insert_sentiment(&self, record: &SentimentRecord) -> Result<()>;

    async fn sentiment_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SentimentRecord>>;

    /// Per-symbol aggregates of records analyzed after `since`, ordered by symbol.
    async fn sentiment_summaries(&self, since: DateTime<Utc>) -> Result<Vec<SentimentSummary>>;
}

#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Appends a row; existing rows are never updated.
    async fn append_signal(&self, record: &TradingSignalRecord) -> Result<()>;

    /// The newest signal of every symbol.
    async fn latest_signals(&self) -> Result<Vec<TradingSignalRecord>>;

    async fn recent_signals(&self, symbol: &str, limit: i64) -> Result<Vec<TradingSignalRecord>>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persists the alert and returns its id.
    async fn insert_alert(&self, alert: &Alert) -> Result<i64>;

    /// Sets delivery flags. Flags only ever move from false to true.
    async fn mark_delivery(&self, id: i64, email_sent: bool, sms_sent: bool) -> Result<()>;

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<Alert>>;

    async fn alerts_for_symbol(&self, symbol: &str, limit: i64) -> Result<Vec<Alert>>;
}

/// Everything a service needs from storage.
pub trait MonitorStore:
    StoreHealth + MarketDataStore + NewsStore + SentimentStore + SignalStore + AlertStore
{
}

impl<T> MonitorStore for T where
    T: StoreHealth + MarketDataStore + NewsStore + SentimentStore + SignalStore + AlertStore
{
}
