//! Scraper service: quotes and company news into the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use fintech_monitor_core::AppConfig;
use fintech_monitor_data::MonitorStore;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::collector::{AlphaVantageClient, NewsApiClient};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrapeReport {
    pub market_data_count: usize,
    pub news_articles_count: usize,
    pub duration_secs: f64,
}

pub struct ScraperService {
    store: Arc<dyn MonitorStore>,
    quotes: AlphaVantageClient,
    news: Option<NewsApiClient>,
    quote_delay: Duration,
    news_delay: Duration,
}

impl ScraperService {
    #[must_use]
    pub fn new(
        store: Arc<dyn MonitorStore>,
        quotes: AlphaVantageClient,
        news: Option<NewsApiClient>,
    ) -> Self {
        Self {
            store,
            quotes,
            news,
            quote_delay: Duration::from_secs(12),
            news_delay: Duration::from_secs(1),
        }
    }

    /// Builds both provider clients from configuration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(store: Arc<dyn MonitorStore>, config: &AppConfig) -> Result<Self> {
        let quotes = AlphaVantageClient::from_config(&config.scraper)?;
        let news = NewsApiClient::from_config(&config.scraper)?;
        Ok(Self::new(store, quotes, news).with_delays(
            Duration::from_secs(config.scraper.quote_delay_secs),
            Duration::from_secs(config.scraper.news_delay_secs),
        ))
    }

    /// Sets the pauses between quote calls and between news calls.
    #[must_use]
    pub fn with_delays(mut self, quote_delay: Duration, news_delay: Duration) -> Self {
        self.quote_delay = quote_delay;
        self.news_delay = news_delay;
        self
    }

    /// Fetches and stores one quote per symbol, sequentially.
    ///
    /// Returns the number of observations stored.
    pub async fn scrape_market_data(&self, symbols: &[String]) -> usize {
        let mut stored = 0;

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !self.quote_delay.is_zero() {
                tokio::time::sleep(self.quote_delay).await;
            }

            let observation = match self.quotes.fetch_quote(symbol).await {
                Ok(Some(observation)) => observation,
                Ok(None) => continue,
                Err(e) => {
                    error!(symbol = %symbol, "Error fetching quote: {}", e);
                    continue;
                }
            };

            match self.store.insert_observation(&observation).await {
                Ok(()) => {
                    info!(symbol = %symbol, price = %observation.price, "Stored market data");
                    stored += 1;
                }
                Err(e) => error!(symbol = %symbol, "Error storing market data: {:#}", e),
            }
        }

        stored
    }

    /// Fetches and stores company news per symbol. Duplicate URLs are ignored.
    ///
    /// Returns the number of new articles. Without a NewsAPI client this
    /// step is skipped.
    pub async fn scrape_news(&self, symbols: &[String]) -> usize {
        let Some(news) = &self.news else {
            warn!("News API key not configured, skipping news scraping");
            return 0;
        };

        let mut inserted = 0;
        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !self.news_delay.is_zero() {
                tokio::time::sleep(self.news_delay).await;
            }

            let articles = match news.fetch_company_news(symbol).await {
                Ok(articles) => articles,
                Err(e) => {
                    error!(symbol = %symbol, "Error fetching news: {}", e);
                    continue;
                }
            };

            let mut new_for_symbol = 0;
            for article in &articles {
                match self.store.insert_article(article).await {
                    Ok(true) => new_for_symbol += 1,
                    Ok(false) => {}
                    Err(e) => error!(symbol = %symbol, url = %article.url, "Error storing article: {:#}", e),
                }
            }
            info!(symbol = %symbol, new = new_for_symbol, fetched = articles.len(), "Stored news articles");
            inserted += new_for_symbol;
        }

        inserted
    }

    /// Runs both scraping steps.
    ///
    /// # Errors
    /// Fails only if the store is unreachable at cycle start.
    pub async fn run_cycle(&self, symbols: &[String]) -> Result<ScrapeReport> {
        info!("Starting scraping cycle");
        let start = Instant::now();

        if let Err(e) = self.store.ensure_connected().await {
            warn!("Store unavailable, aborting scraping cycle");
            return Err(e);
        }

        let market_data_count = self.scrape_market_data(symbols).await;
        let news_articles_count = self.scrape_news(symbols).await;

        let report = ScrapeReport {
            market_data_count,
            news_articles_count,
            duration_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            market_data_count,
            news_articles_count,
            duration_secs = report.duration_secs,
            "Scraping cycle completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fintech_monitor_data::{MemoryStore, Table};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quote(price: &str, change: &str) -> serde_json::Value {
        json!({
            "Global Quote": {
                "05. price": price,
                "06. volume": "1000",
                "09. change": "1.00",
                "10. change percent": change
            }
        })
    }

    async fn providers() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", "AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote("190.00", "6.0%")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", "MSFT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "articles": [
                    {"title": "Shared story", "url": "https://example.com/shared"}
                ]
            })))
            .mount(&server)
            .await;

        server
    }

    fn service(store: Arc<MemoryStore>, server: &MockServer, with_news: bool) -> ScraperService {
        let quotes = AlphaVantageClient::new("demo", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        let news = with_news.then(|| {
            NewsApiClient::new("key", Duration::from_secs(5))
                .unwrap()
                .with_base_url(server.uri())
        });
        ScraperService::new(store, quotes, news).with_delays(Duration::ZERO, Duration::ZERO)
    }

    fn symbols() -> Vec<String> {
        vec!["AAPL".to_string(), "MSFT".to_string()]
    }

    #[tokio::test]
    async fn test_failed_symbol_is_skipped() {
        let server = providers().await;
        let store = Arc::new(MemoryStore::new());

        let stored = service(store.clone(), &server, false)
            .scrape_market_data(&symbols())
            .await;

        assert_eq!(stored, 1);
        assert_eq!(store.observations()[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_news_deduplicates_by_url() {
        let server = providers().await;
        let store = Arc::new(MemoryStore::new());

        // both symbols return the same URL
        let inserted = service(store.clone(), &server, true)
            .scrape_news(&symbols())
            .await;

        assert_eq!(inserted, 1);
        assert_eq!(store.articles().len(), 1);
    }

    #[tokio::test]
    async fn test_news_skipped_without_client() {
        let server = providers().await;
        let store = Arc::new(MemoryStore::new());

        assert_eq!(service(store, &server, false).scrape_news(&symbols()).await, 0);
    }

    #[tokio::test]
    async fn test_run_cycle_counts() {
        let server = providers().await;
        let store = Arc::new(MemoryStore::new());

        let report = service(store, &server, true)
            .run_cycle(&symbols())
            .await
            .unwrap();
        assert_eq!(report.market_data_count, 1);
        assert_eq!(report.news_articles_count, 1);
    }

    #[tokio::test]
    async fn test_run_cycle_fails_when_offline() {
        let server = providers().await;
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);

        assert!(service(store, &server, true)
            .run_cycle(&symbols())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_store_failure_is_logged_not_raised() {
        let server = providers().await;
        let store = Arc::new(MemoryStore::new());
        store.fail_table(Table::MarketData);

        let stored = service(store, &server, false)
            .scrape_market_data(&symbols())
            .await;
        assert_eq!(stored, 0);
    }
}
