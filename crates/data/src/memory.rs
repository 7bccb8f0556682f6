//! In-process store with the same semantics as the Postgres repositories.
//!
//! Used for tests and dry runs. Individual tables can be made to fail, and
//! the whole store can be taken offline, to exercise error paths.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fintech_monitor_core::MonitorError;

use crate::models::{
    Alert, NewArticle, NewsArticle, PriceObservation, SentimentRecord, SentimentSummary,
    TradingSignalRecord,
};
use crate::store::{
    AlertStore, MarketDataStore, NewsStore, SentimentStore, SignalStore, StoreHealth,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    MarketData,
    News,
    Sentiment,
    Signals,
    Alerts,
}

#[derive(Default)]
struct Inner {
    observations: Vec<PriceObservation>,
    articles: Vec<NewsArticle>,
    sentiment: Vec<SentimentRecord>,
    signals: Vec<TradingSignalRecord>,
    alerts: Vec<Alert>,
    failing: HashSet<Table>,
    offline: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read and write against `table` fail.
    pub fn fail_table(&self, table: Table) {
        self.lock().failing.insert(table);
    }

    /// Makes [`StoreHealth::ensure_connected`] report a connectivity error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Stores an article with an explicit id and fetch time.
    pub fn seed_article(&self, article: NewsArticle) {
        self.lock().articles.push(article);
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().alerts.clone()
    }

    #[must_use]
    pub fn signals(&self) -> Vec<TradingSignalRecord> {
        self.lock().signals.clone()
    }

    #[must_use]
    pub fn sentiment_records(&self) -> Vec<SentimentRecord> {
        self.lock().sentiment.clone()
    }

    #[must_use]
    pub fn observations(&self) -> Vec<PriceObservation> {
        self.lock().observations.clone()
    }

    #[must_use]
    pub fn articles(&self) -> Vec<NewsArticle> {
        self.lock().articles.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn guard(&self, table: Table) -> Result<MutexGuard<'_, Inner>> {
        let inner = self.lock();
        if inner.failing.contains(&table) {
            bail!("simulated failure on {table:?}");
        }
        Ok(inner)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ensure_connected(&self) -> Result<()> {
        if self.lock().offline {
            return Err(MonitorError::connectivity("memory", "store offline").into());
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataStore for MemoryStore {
    async fn insert_observation(&self, observation: &PriceObservation) -> Result<()> {
        self.guard(Table::MarketData)?
            .observations
            .push(observation.clone());
        Ok(())
    }

    async fn recent_observations(
        &self,
        symbol: &str,
        limit: i64,
    ) -> Result<Vec<PriceObservation>> {
        let inner = self.guard(Table::MarketData)?;
        let mut rows: Vec<_> = inner
            .observations
            .iter()
            .filter(|o| o.symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }

    async fn latest_observations(&self) -> Result<Vec<PriceObservation>> {
        let inner = self.guard(Table::MarketData)?;
        let mut latest: BTreeMap<&str, &PriceObservation> = BTreeMap::new();
        for obs in &inner.observations {
            match latest.get(obs.symbol.as_str()) {
                Some(current) if current.timestamp > obs.timestamp => {}
                _ => {
                    latest.insert(&obs.symbol, obs);
                }
            }
        }
        Ok(latest.into_values().cloned().collect())
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn insert_article(&self, article: &NewArticle) -> Result<bool> {
        let mut inner = self.guard(Table::News)?;
        if inner.articles.iter().any(|a| a.url == article.url) {
            return Ok(false);
        }
        let id = inner.articles.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        inner.articles.push(NewsArticle {
            id,
            symbol: article.symbol.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            content: article.content.clone(),
            source: article.source.clone(),
            url: article.url.clone(),
            published_at: article.published_at,
            fetched_at: Utc::now(),
        });
        Ok(true)
    }

    async fn unanalyzed_articles(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<NewsArticle>> {
        let inner = self.guard(Table::News)?;
        let analyzed: HashSet<i64> = inner.sentiment.iter().map(|s| s.article_id).collect();
        let mut rows: Vec<_> = inner
            .articles
            .iter()
            .filter(|a| a.fetched_at > since && !analyzed.contains(&a.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }

    async fn recent_articles(&self, symbol: &str, limit: i64) -> Result<Vec<NewsArticle>> {
        let inner = self.guard(Table::News)?;
        let mut rows: Vec<_> = inner
            .articles
            .iter()
            .filter(|a| a.symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.fetched_at.cmp(&a.fetched_at))
        });
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }
}

#[async_trait]
impl SentimentStore for MemoryStore {
    async fn insert_sentiment(&self, record: &SentimentRecord) -> Result<()> {
        let mut inner = self.guard(Table::Sentiment)?;
        if inner
            .sentiment
            .iter()
            .any(|s| s.article_id == record.article_id)
        {
            bail!("article {} already analyzed", record.article_id);
        }
        inner.sentiment.push(record.clone());
        Ok(())
    }

    async fn sentiment_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SentimentRecord>> {
        let inner = self.guard(Table::Sentiment)?;
        let mut rows: Vec<_> = inner
            .sentiment
            .iter()
            .filter(|s| s.symbol == symbol && s.analyzed_at > since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at));
        Ok(rows)
    }

    async fn sentiment_summaries(&self, since: DateTime<Utc>) -> Result<Vec<SentimentSummary>> {
        let inner = self.guard(Table::Sentiment)?;
        let mut by_symbol: BTreeMap<&str, Vec<SentimentRecord>> = BTreeMap::new();
        for record in inner.sentiment.iter().filter(|s| s.analyzed_at > since) {
            by_symbol
                .entry(record.symbol.as_str())
                .or_default()
                .push(record.clone());
        }
        Ok(by_symbol
            .into_iter()
            .filter_map(|(symbol, records)| SentimentSummary::from_records(symbol, &records))
            .collect())
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn append_signal(&self, record: &TradingSignalRecord) -> Result<()> {
        self.guard(Table::Signals)?.signals.push(record.clone());
        Ok(())
    }

    async fn latest_signals(&self) -> Result<Vec<TradingSignalRecord>> {
        let inner = self.guard(Table::Signals)?;
        let mut latest: BTreeMap<&str, &TradingSignalRecord> = BTreeMap::new();
        for signal in &inner.signals {
            match latest.get(signal.symbol.as_str()) {
                Some(current) if current.timestamp > signal.timestamp => {}
                _ => {
                    latest.insert(&signal.symbol, signal);
                }
            }
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn recent_signals(&self, symbol: &str, limit: i64) -> Result<Vec<TradingSignalRecord>> {
        let inner = self.guard(Table::Signals)?;
        let mut rows: Vec<_> = inner
            .signals
            .iter()
            .filter(|s| s.symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn insert_alert(&self, alert: &Alert) -> Result<i64> {
        let mut inner = self.guard(Table::Alerts)?;
        let id = inner.alerts.len() as i64 + 1;
        let mut stored = alert.clone();
        stored.id = Some(id);
        inner.alerts.push(stored);
        Ok(id)
    }

    async fn mark_delivery(&self, id: i64, email_sent: bool, sms_sent: bool) -> Result<()> {
        let mut inner = self.guard(Table::Alerts)?;
        if let Some(alert) = inner.alerts.iter_mut().find(|a| a.id == Some(id)) {
            alert.email_sent |= email_sent;
            alert.sms_sent |= sms_sent;
        }
        Ok(())
    }

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<Alert>> {
        let inner = self.guard(Table::Alerts)?;
        let mut rows = inner.alerts.clone();
        rows.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }

    async fn alerts_for_symbol(&self, symbol: &str, limit: i64) -> Result<Vec<Alert>> {
        let inner = self.guard(Table::Alerts)?;
        let mut rows: Vec<_> = inner
            .alerts
            .iter()
            .filter(|a| a.symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}
