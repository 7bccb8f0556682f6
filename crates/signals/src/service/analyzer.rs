//! Analyzer service: article sentiment, then price/sentiment fusion.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use fintech_monitor_core::{AppConfig, FusedSignal, WindowConfig};
use fintech_monitor_data::{MonitorStore, SentimentRecord, TradingSignalRecord};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::generator::{PriceSignalEngine, SentimentAggregator, SignalFusionEngine};
use crate::sentiment::SentimentSource;

/// Counts and signals produced by one analyzer cycle.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub sentiment_analyses: usize,
    pub trading_signals: usize,
    pub signals: Vec<FusedSignal>,
}

pub struct AnalyzerService {
    store: Arc<dyn MonitorStore>,
    sentiment: SentimentSource,
    price_engine: PriceSignalEngine,
    aggregator: SentimentAggregator,
    fusion: SignalFusionEngine,
    windows: WindowConfig,
    request_delay: Duration,
}

impl AnalyzerService {
    #[must_use]
    pub fn new(store: Arc<dyn MonitorStore>, sentiment: SentimentSource, config: &AppConfig) -> Self {
        Self {
            store,
            sentiment,
            price_engine: PriceSignalEngine::new(config.thresholds.price_change_threshold),
            aggregator: SentimentAggregator::with_hours(config.windows.fusion_sentiment_hours),
            fusion: SignalFusionEngine::new(),
            windows: config.windows,
            request_delay: Duration::from_millis(config.sentiment.request_delay_ms),
        }
    }

    /// Overrides the pause between classifier calls.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Classifies articles fetched in the last `hours` that have no sentiment yet.
    ///
    /// Returns the number of records persisted. A record that fails to
    /// persist is logged and skipped.
    ///
    /// # Errors
    /// Returns an error if the unanalyzed articles cannot be loaded.
    pub async fn analyze_recent_news(&self, hours: i64) -> Result<usize> {
        let since = Utc::now() - ChronoDuration::hours(hours);
        let articles = self
            .store
            .unanalyzed_articles(since, self.windows.news_analysis_batch)
            .await?;

        info!("Analyzing {} articles", articles.len());

        let mut persisted = 0;
        for (i, article) in articles.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let analysis = self.sentiment.analyze(&article.analysis_text()).await;
            let record =
                SentimentRecord::from_analysis(article.id, &article.symbol, analysis, Utc::now());

            match self.store.insert_sentiment(&record).await {
                Ok(()) => persisted += 1,
                Err(e) => error!(
                    article_id = article.id,
                    symbol = %article.symbol,
                    "Error storing sentiment: {:#}", e
                ),
            }
        }

        info!("Completed sentiment analysis for {} articles", persisted);
        Ok(persisted)
    }

    /// Fuses price and sentiment for one symbol without persisting.
    ///
    /// # Errors
    /// Returns an error if price history or sentiment cannot be loaded.
    pub async fn signal_for(&self, symbol: &str) -> Result<FusedSignal> {
        let now = Utc::now();
        let history = self
            .store
            .recent_observations(symbol, self.windows.price_history_limit)
            .await?;
        let price = self.price_engine.evaluate(symbol, &history);
        let sentiment = self.aggregator.load(self.store.as_ref(), symbol, now).await?;
        Ok(self.fusion.fuse(price, sentiment, now))
    }

    /// Generates and appends one trading signal per symbol.
    ///
    /// Failures are isolated per symbol; the returned list holds only the
    /// signals that were persisted.
    pub async fn generate_signals(&self, symbols: &[String]) -> Vec<FusedSignal> {
        let mut signals = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let fused = match self.signal_for(symbol).await {
                Ok(fused) => fused,
                Err(e) => {
                    error!(symbol = %symbol, "Error generating signal: {:#}", e);
                    continue;
                }
            };

            if let Err(e) = self
                .store
                .append_signal(&TradingSignalRecord::from_fused(&fused))
                .await
            {
                error!(symbol = %symbol, "Error storing signal: {:#}", e);
                continue;
            }

            info!(
                symbol = %symbol,
                signal = fused.signal.as_str(),
                score = fused.composite_score,
                "Generated signal"
            );
            signals.push(fused);
        }

        signals
    }

    /// Runs sentiment analysis then signal generation.
    ///
    /// # Errors
    /// Fails only if the store is unreachable at cycle start or the article
    /// batch cannot be loaded.
    pub async fn run_cycle(&self, symbols: &[String]) -> Result<AnalysisReport> {
        info!("Starting analysis cycle");

        if let Err(e) = self.store.ensure_connected().await {
            warn!("Store unavailable, aborting analysis cycle");
            return Err(e);
        }

        let sentiment_analyses = self
            .analyze_recent_news(self.windows.news_analysis_hours)
            .await?;
        let signals = self.generate_signals(symbols).await;

        info!(
            sentiment_analyses,
            trading_signals = signals.len(),
            "Analysis cycle completed"
        );

        Ok(AnalysisReport {
            sentiment_analyses,
            trading_signals: signals.len(),
            signals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fintech_monitor_core::{FinalSignal, MonitorError};
    use fintech_monitor_data::{MarketDataStore, MemoryStore, NewsArticle, PriceObservation, Table};
    use rust_decimal_macros::dec;

    fn service(store: Arc<MemoryStore>) -> AnalyzerService {
        AnalyzerService::new(store, SentimentSource::heuristic_only(), &AppConfig::default())
            .with_request_delay(Duration::ZERO)
    }

    fn article(id: i64, symbol: &str, title: &str, hours_ago: i64) -> NewsArticle {
        NewsArticle {
            id,
            symbol: symbol.to_string(),
            title: title.to_string(),
            description: None,
            content: None,
            source: None,
            url: format!("https://example.com/{id}"),
            published_at: None,
            fetched_at: Utc::now() - ChronoDuration::hours(hours_ago),
        }
    }

    async fn seed_prices(store: &MemoryStore, symbol: &str, change_percent: f64) {
        let now = Utc::now();
        for (minutes_ago, change) in [(60, 0.5), (0, change_percent)] {
            store
                .insert_observation(&PriceObservation::new(
                    symbol,
                    dec!(100),
                    change,
                    1_000,
                    now - ChronoDuration::minutes(minutes_ago),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_analyze_recent_news_skips_old_and_analyzed() {
        let store = Arc::new(MemoryStore::new());
        store.seed_article(article(1, "AAPL", "Apple shares surge on record profit", 1));
        store.seed_article(article(2, "AAPL", "Old news", 48));

        let svc = service(store.clone());
        assert_eq!(svc.analyze_recent_news(24).await.unwrap(), 1);
        // second pass finds nothing left to do
        assert_eq!(svc.analyze_recent_news(24).await.unwrap(), 0);

        let records = store.sentiment_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].article_id, 1);
        assert!(records[0].score > 0.0);
        assert_eq!(records[0].key_points, vec!["Fallback analysis used".to_string()]);
    }

    #[tokio::test]
    async fn test_storage_failure_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.seed_article(article(1, "AAPL", "Apple gains", 1));
        store.fail_table(Table::Sentiment);

        // the article query succeeds; each insert fails and is logged
        let svc = service(store.clone());
        assert_eq!(svc.analyze_recent_news(24).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_signals_appends_one_row_per_symbol() {
        let store = Arc::new(MemoryStore::new());
        seed_prices(&store, "AAPL", 12.0).await;

        let svc = service(store.clone());
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let signals = svc.generate_signals(&symbols).await;

        assert_eq!(signals.len(), 2);
        // +12% with neutral sentiment: 0.6 * 1.0
        assert_eq!(signals[0].signal, FinalSignal::StrongBuy);
        // no price history and no sentiment
        assert_eq!(signals[1].signal, FinalSignal::Hold);
        assert_eq!(signals[1].price.reason, "Insufficient data");

        svc.generate_signals(&symbols).await;
        assert_eq!(store.signals().len(), 4);
    }

    #[tokio::test]
    async fn test_generate_signals_isolates_failures() {
        let store = Arc::new(MemoryStore::new());
        store.fail_table(Table::Signals);

        let svc = service(store.clone());
        let signals = svc
            .generate_signals(&["AAPL".to_string(), "MSFT".to_string()])
            .await;
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn test_run_cycle_requires_store() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);

        let err = service(store).run_cycle(&["AAPL".to_string()]).await.unwrap_err();
        assert!(err
            .downcast_ref::<MonitorError>()
            .is_some_and(MonitorError::is_connectivity));
    }

    #[tokio::test]
    async fn test_run_cycle_reports_counts() {
        let store = Arc::new(MemoryStore::new());
        store.seed_article(article(1, "MSFT", "Microsoft stock falls after loss", 2));
        seed_prices(&store, "MSFT", -7.0).await;

        let report = service(store)
            .run_cycle(&["MSFT".to_string()])
            .await
            .unwrap();

        assert_eq!(report.sentiment_analyses, 1);
        assert_eq!(report.trading_signals, 1);
        // -0.6 * 0.7 + 0.4 * -1 * 0.5
        assert_eq!(report.signals[0].signal, FinalSignal::StrongSell);
    }
}
