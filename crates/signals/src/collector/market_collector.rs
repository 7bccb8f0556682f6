//! Alpha Vantage `GLOBAL_QUOTE` collector.
//!
//! The free tier allows five requests per minute; callers additionally
//! space calls with an explicit delay.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fintech_monitor_core::{MonitorError, ScraperConfig};
use fintech_monitor_data::PriceObservation;
use nonzero_ext::nonzero;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::{http_client, per_minute_limiter, transport_error, DirectLimiter};

pub const ALPHA_VANTAGE_API_URL: &str = "https://www.alphavantage.co";

const SOURCE_NAME: &str = "alpha_vantage";

pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    rate_limiter: Arc<DirectLimiter>,
}

impl AlphaVantageClient {
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        Ok(Self {
            http: http_client(SOURCE_NAME, timeout)?,
            base_url: ALPHA_VANTAGE_API_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            rate_limiter: per_minute_limiter(nonzero!(5u32)),
        })
    }

    /// Builds a client from configuration. Without a key the public `demo` key is used.
    ///
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, MonitorError> {
        let key = config
            .alpha_vantage_key
            .clone()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| "demo".to_string());
        Ok(
            Self::new(key, Duration::from_secs(config.timeout_secs))?
                .with_base_url(config.alpha_vantage_url.clone()),
        )
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.rate_limiter = per_minute_limiter(requests_per_minute);
        self
    }

    /// Fetches the current quote for a symbol.
    ///
    /// Returns `Ok(None)` when the provider answers without quote data, which
    /// is how Alpha Vantage reports unknown symbols and throttling notes.
    ///
    /// # Errors
    /// Returns a connectivity error on transport failure or a non-2xx status,
    /// and an invalid-response error if the quote fields cannot be parsed.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Option<PriceObservation>, MonitorError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/query", self.base_url.trim_end_matches('/'));
        debug!(symbol, "GET GLOBAL_QUOTE");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.expose_secret()),
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

        let body: QuoteResponse = response
            .json()
            .await
            .map_err(|e| MonitorError::invalid_response(SOURCE_NAME, e.to_string()))?;

        match body.global_quote {
            Some(quote) if !quote.is_empty() => parse_quote(symbol, &quote, Utc::now()).map(Some),
            _ => {
                warn!(symbol, "No data returned");
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

/// Alpha Vantage sends every field as a string.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "05. price", default)]
    pub price: Option<String>,
    #[serde(rename = "06. volume", default)]
    pub volume: Option<String>,
    #[serde(rename = "09. change", default)]
    pub change: Option<String>,
    #[serde(rename = "10. change percent", default)]
    pub change_percent: Option<String>,
}

impl GlobalQuote {
    fn is_empty(&self) -> bool {
        self.price.is_none() && self.change_percent.is_none()
    }
}

/// Converts a quote into an observation. Missing fields default to zero.
///
/// # Errors
/// Returns [`MonitorError::InvalidResponse`] if a present field is not numeric.
pub fn parse_quote(
    symbol: &str,
    quote: &GlobalQuote,
    timestamp: DateTime<Utc>,
) -> Result<PriceObservation, MonitorError> {
    let invalid = |field: &str, value: &str| {
        MonitorError::invalid_response(SOURCE_NAME, format!("{symbol}: bad {field} {value:?}"))
    };

    let decimal = |field: &str, raw: &Option<String>| -> Result<Decimal, MonitorError> {
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(Decimal::ZERO),
            Some(v) => Decimal::from_str(v).map_err(|_| invalid(field, v)),
        }
    };

    let price = decimal("price", &quote.price)?;
    let change_amount = decimal("change", &quote.change)?;

    let change_percent = match quote.change_percent.as_deref().map(str::trim) {
        None | Some("") => 0.0,
        Some(v) => v
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| invalid("change percent", v))?,
    };

    let volume = match quote.volume.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(v) => v.parse::<i64>().map_err(|_| invalid("volume", v))?,
    };

    Ok(
        PriceObservation::new(symbol, price, change_percent, volume, timestamp)
            .with_change_amount(change_amount),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quote_json() -> serde_json::Value {
        json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "05. price": "189.9800",
                "06. volume": "52164500",
                "09. change": "11.2300",
                "10. change percent": "6.2825%"
            }
        })
    }

    #[test]
    fn test_parse_quote_strips_percent() {
        let quote = GlobalQuote {
            price: Some("189.9800".to_string()),
            volume: Some("52164500".to_string()),
            change: Some("-11.23".to_string()),
            change_percent: Some("-5.5123%".to_string()),
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap();
        let obs = parse_quote("AAPL", &quote, at).unwrap();
        assert_eq!(obs.price, dec!(189.98));
        assert_eq!(obs.change_amount, dec!(-11.23));
        assert!((obs.change_percent + 5.5123).abs() < 1e-12);
        assert_eq!(obs.volume, 52_164_500);
        assert_eq!(obs.timestamp, at);
    }

    #[test]
    fn test_parse_quote_rejects_garbage() {
        let quote = GlobalQuote {
            price: Some("n/a".to_string()),
            ..GlobalQuote::default()
        };
        let err = parse_quote("AAPL", &quote, Utc::now()).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_quote_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "GLOBAL_QUOTE"))
            .and(query_param("symbol", "AAPL"))
            .and(query_param("apikey", "key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(quote_json()))
            .mount(&mock_server)
            .await;

        let client = AlphaVantageClient::new("key-123", Duration::from_secs(5))
            .unwrap()
            .with_base_url(mock_server.uri());
        let obs = client.fetch_quote("AAPL").await.unwrap().unwrap();

        assert_eq!(obs.symbol, "AAPL");
        assert!((obs.change_percent - 6.2825).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_fetch_quote_empty_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
            })))
            .mount(&mock_server)
            .await;

        let client = AlphaVantageClient::new("demo", Duration::from_secs(5))
            .unwrap()
            .with_base_url(mock_server.uri());
        assert!(client.fetch_quote("ZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_quote_server_error_is_connectivity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = AlphaVantageClient::new("demo", Duration::from_secs(5))
            .unwrap()
            .with_base_url(mock_server.uri());
        let err = client.fetch_quote("AAPL").await.unwrap_err();
        assert!(err.is_connectivity());
    }
}
