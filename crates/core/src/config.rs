use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub thresholds: ThresholdConfig,
    pub windows: WindowConfig,
    #[serde(deserialize_with = "deserialize_symbols")]
    pub symbols: Vec<String>,
    pub sentiment: SentimentConfig,
    pub scraper: ScraperConfig,
    pub notifications: NotificationConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub scraper_port: u16,
    pub analyzer_port: u16,
    pub alert_port: u16,
    /// Port used when every service is mounted on a single listener.
    pub combined_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Connection attempts before a cycle gives up on the store.
    pub connect_attempts: u32,
    pub retry_delay_secs: u64,
    pub acquire_timeout_secs: u64,
}

/// Thresholds shared by the price engine and the alert evaluator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Absolute percent move that counts as a strong price movement.
    pub price_change_threshold: f64,
    /// Mean sentiment below which a sentiment alert fires.
    pub sentiment_threshold: f64,
}

/// Lookback windows and row limits for the analyzer and evaluator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub fusion_sentiment_hours: i64,
    pub alert_sentiment_hours: i64,
    pub signal_alert_hours: i64,
    pub min_sentiment_articles: i64,
    pub price_history_limit: i64,
    pub news_analysis_hours: i64,
    pub news_analysis_batch: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Pause between classifier calls in a batch.
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub alpha_vantage_key: Option<String>,
    pub alpha_vantage_url: String,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub quote_delay_secs: u64,
    pub news_delay_secs: u64,
    pub timeout_secs: u64,
    pub articles_per_symbol: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub email_recipient: Option<String>,
    pub email_sender: String,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_url: String,
    pub sms_recipient: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    pub twilio_url: String,
    pub max_sms_per_cycle: usize,
    pub sms_max_chars: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub scrape_interval_secs: u64,
    pub analyze_interval_secs: u64,
    pub alert_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            thresholds: ThresholdConfig::default(),
            windows: WindowConfig::default(),
            symbols: vec!["AAPL".to_string(), "GOOGL".to_string(), "MSFT".to_string()],
            sentiment: SentimentConfig::default(),
            scraper: ScraperConfig::default(),
            notifications: NotificationConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            scraper_port: 5000,
            analyzer_port: 5001,
            alert_port: 5002,
            combined_port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/fintech_monitor".to_string(),
            max_connections: 5,
            connect_attempts: 5,
            retry_delay_secs: 5,
            acquire_timeout_secs: 10,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            price_change_threshold: 5.0,
            sentiment_threshold: -0.3,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fusion_sentiment_hours: 24,
            alert_sentiment_hours: 6,
            signal_alert_hours: 1,
            min_sentiment_articles: 3,
            price_history_limit: 20,
            news_analysis_hours: 24,
            news_analysis_batch: 20,
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-pro".to_string(),
            timeout_secs: 30,
            request_delay_ms: 500,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_key: None,
            alpha_vantage_url: "https://www.alphavantage.co".to_string(),
            news_api_key: None,
            news_api_url: "https://newsapi.org".to_string(),
            quote_delay_secs: 12,
            news_delay_secs: 1,
            timeout_secs: 10,
            articles_per_symbol: 5,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_recipient: None,
            email_sender: "alerts@fintech-monitor.local".to_string(),
            sendgrid_api_key: None,
            sendgrid_url: "https://api.sendgrid.com".to_string(),
            sms_recipient: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
            twilio_url: "https://api.twilio.com".to_string(),
            max_sms_per_cycle: 3,
            sms_max_chars: 160,
            timeout_secs: 30,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scrape_interval_secs: 3600,
            analyze_interval_secs: 1800,
            alert_interval_secs: 900,
        }
    }
}

/// Accepts either a list or a comma-separated string such as `AAPL,GOOGL,MSFT`.
fn deserialize_symbols<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Symbols {
        List(Vec<String>),
        Csv(String),
    }

    let raw = match Symbols::deserialize(deserializer)? {
        Symbols::List(list) => list,
        Symbols::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = AppConfig::default();
        assert_eq!(config.thresholds.price_change_threshold, 5.0);
        assert_eq!(config.thresholds.sentiment_threshold, -0.3);
        assert_eq!(config.windows.alert_sentiment_hours, 6);
        assert_eq!(config.windows.fusion_sentiment_hours, 24);
        assert_eq!(config.windows.min_sentiment_articles, 3);
        assert_eq!(config.database.connect_attempts, 5);
        assert_eq!(config.database.retry_delay_secs, 5);
        assert_eq!(config.notifications.max_sms_per_cycle, 3);
        assert_eq!(config.symbols, vec!["AAPL", "GOOGL", "MSFT"]);
    }

    #[test]
    fn test_symbols_from_csv_string() {
        let config: AppConfig =
            serde_json::from_str(r#"{"symbols": " aapl, tsla ,,amzn"}"#).unwrap();
        assert_eq!(config.symbols, vec!["AAPL", "TSLA", "AMZN"]);
    }

    #[test]
    fn test_symbols_from_list() {
        let config: AppConfig = serde_json::from_str(r#"{"symbols": ["msft"]}"#).unwrap();
        assert_eq!(config.symbols, vec!["MSFT"]);
        // untouched sections keep their defaults
        assert_eq!(config.server.alert_port, 5002);
    }
}
