//! Postgres repositories for the monitoring pipeline.
//!
//! Each repository owns one table. Every call obtains its pool through
//! [`DatabaseClient::pool`], so a stale connection is detected and
//! reopened before the query runs.

pub mod alert_repo;
pub mod market_repo;
pub mod news_repo;
pub mod sentiment_repo;
pub mod signal_repo;

pub use alert_repo::AlertRepository;
pub use market_repo::MarketDataRepository;
pub use news_repo::NewsArticleRepository;
pub use sentiment_repo::SentimentRepository;
pub use signal_repo::TradingSignalRepository;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::DatabaseClient;
use crate::models::{
    Alert, NewArticle, NewsArticle, PriceObservation, SentimentRecord, SentimentSummary,
    TradingSignalRecord,
};
use crate::store::{
    AlertStore, MarketDataStore, NewsStore, SentimentStore, SignalStore, StoreHealth,
};

/// All repositories sharing one database client.
#[derive(Clone)]
pub struct Repositories {
    db: Arc<DatabaseClient>,
    pub market_data: MarketDataRepository,
    pub news: NewsArticleRepository,
    pub sentiment: SentimentRepository,
    pub signals: TradingSignalRepository,
    pub alerts: AlertRepository,
}

impl Repositories {
    #[must_use]
    pub fn new(db: Arc<DatabaseClient>) -> Self {
        Self {
            market_data: MarketDataRepository::new(db.clone()),
            news: NewsArticleRepository::new(db.clone()),
            sentiment: SentimentRepository::new(db.clone()),
            signals: TradingSignalRepository::new(db.clone()),
            alerts: AlertRepository::new(db.clone()),
            db,
        }
    }

    #[must_use]
    pub fn database(&self) -> &Arc<DatabaseClient> {
        &self.db
    }
}

#[async_trait]
impl StoreHealth for Repositories {
    async fn ensure_connected(&self) -> Result<()> {
        self.db.pool().await?;
        Ok(())
    }
}

#[async_trait]
impl MarketDataStore for Repositories {
    async fn insert_observation(&self, observation: &PriceObservation) -> Result<()> {
        self.market_data.insert(observation).await
    }

    async fn recent_observations(
        &self,
        symbol: &str,
        limit: i64,
    ) -> Result<Vec<PriceObservation>> {
        self.market_data.query_recent(symbol, limit).await
    }

    async fn latest_observations(&self) -> Result<Vec<PriceObservation>> {
        self.market_data.query_latest_per_symbol().await
    }
}

#[async_trait]
impl NewsStore for Repositories {
    async fn insert_article(&self, article: &NewArticle) -> Result<bool> {
        self.news.insert(article).await
    }

    async fn unanalyzed_articles(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<NewsArticle>> {
        self.news.query_unanalyzed(since, limit).await
    }

    async fn recent_articles(&self, symbol: &str, limit: i64) -> Result<Vec<NewsArticle>> {
        self.news.query_recent(symbol, limit).await
    }
}

#[async_trait]
impl SentimentStore for Repositories {
    async fn insert_sentiment(&self, record: &SentimentRecord) -> Result<()> {
        self.sentiment.insert(record).await
    }

    async fn sentiment_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SentimentRecord>> {
        self.sentiment.query_since(symbol, since).await
    }

    async fn sentiment_summaries(&self, since: DateTime<Utc>) -> Result<Vec<SentimentSummary>> {
        self.sentiment.query_summaries(since).await
    }
}

#[async_trait]
impl SignalStore for Repositories {
    async fn append_signal(&self, record: &TradingSignalRecord) -> Result<()> {
        self.signals.insert(record).await
    }

    async fn latest_signals(&self) -> Result<Vec<TradingSignalRecord>> {
        self.signals.query_latest_per_symbol().await
    }

    async fn recent_signals(&self, symbol: &str, limit: i64) -> Result<Vec<TradingSignalRecord>> {
        self.signals.query_recent(symbol, limit).await
    }
}

#[async_trait]
impl AlertStore for Repositories {
    async fn insert_alert(&self, alert: &Alert) -> Result<i64> {
        self.alerts.insert(alert).await
    }

    async fn mark_delivery(&self, id: i64, email_sent: bool, sms_sent: bool) -> Result<()> {
        self.alerts.mark_delivery(id, email_sent, sms_sent).await
    }

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<Alert>> {
        self.alerts.query_recent(limit).await
    }

    async fn alerts_for_symbol(&self, symbol: &str, limit: i64) -> Result<Vec<Alert>> {
        self.alerts.query_by_symbol(symbol, limit).await
    }
}
