//! NewsAPI `/v2/everything` collector.
//!
//! Searches by company name rather than ticker, which NewsAPI matches far
//! more reliably.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fintech_monitor_core::{MonitorError, ScraperConfig};
use fintech_monitor_data::NewArticle;
use nonzero_ext::nonzero;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::{http_client, per_minute_limiter, transport_error, DirectLimiter};

pub const NEWS_API_URL: &str = "https://newsapi.org";

const SOURCE_NAME: &str = "newsapi";

/// Search term for a ticker. Unknown tickers are searched as-is.
#[must_use]
pub fn company_name(symbol: &str) -> &str {
    match symbol {
        "AAPL" => "Apple",
        "GOOGL" => "Google",
        "MSFT" => "Microsoft",
        "TSLA" => "Tesla",
        "AMZN" => "Amazon",
        other => other,
    }
}

pub struct NewsApiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    page_size: u32,
    rate_limiter: Arc<DirectLimiter>,
}

impl NewsApiClient {
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        Ok(Self {
            http: http_client(SOURCE_NAME, timeout)?,
            base_url: NEWS_API_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            page_size: 5,
            rate_limiter: per_minute_limiter(nonzero!(60u32)),
        })
    }

    /// Builds a client from configuration. Returns `None` without an API key.
    ///
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn from_config(config: &ScraperConfig) -> Result<Option<Self>, MonitorError> {
        let Some(key) = config.news_api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let client = Self::new(key, Duration::from_secs(config.timeout_secs))?
            .with_base_url(config.news_api_url.clone())
            .with_page_size(config.articles_per_symbol);
        Ok(Some(client))
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.rate_limiter = per_minute_limiter(requests_per_minute);
        self
    }

    /// Fetches the newest English articles mentioning the company behind `symbol`.
    ///
    /// Articles without a title or URL are dropped.
    ///
    /// # Errors
    /// Returns a connectivity error on transport failure or a non-2xx status,
    /// and an invalid-response error if NewsAPI reports an error body.
    pub async fn fetch_company_news(&self, symbol: &str) -> Result<Vec<NewArticle>, MonitorError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v2/everything", self.base_url.trim_end_matches('/'));
        let query = company_name(symbol);
        let page_size = self.page_size.to_string();
        debug!(symbol, query, "GET everything");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE_NAME, &e))?;

        if !response.status().is_success() {
            return Err(MonitorError::connectivity(
                SOURCE_NAME,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| MonitorError::invalid_response(SOURCE_NAME, e.to_string()))?;

        if body.status != "ok" {
            return Err(MonitorError::invalid_response(
                SOURCE_NAME,
                body.message.unwrap_or_else(|| format!("status {}", body.status)),
            ));
        }

        let articles: Vec<NewArticle> = body
            .articles
            .into_iter()
            .filter_map(|raw| raw.into_new_article(symbol))
            .collect();

        if articles.is_empty() {
            warn!(symbol, "No articles returned");
        }
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

impl RawArticle {
    fn into_new_article(self, symbol: &str) -> Option<NewArticle> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let url = self.url.filter(|u| !u.trim().is_empty())?;

        let mut article = NewArticle::new(symbol, title, url);
        if let Some(description) = self.description {
            article = article.with_description(description);
        }
        if let Some(name) = self.source.and_then(|s| s.name) {
            article = article.with_source(name);
        }
        if let Some(published_at) = self.published_at {
            article = article.with_published_at(published_at);
        }
        article.content = self.content;
        Some(article)
    }
}
