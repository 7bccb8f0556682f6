//! Gemini `generateContent` client used as the sentiment capability.
//!
//! The model is asked for a JSON object; markdown fences around the reply
//! are stripped before parsing.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fintech_monitor_core::{
    MarketImpact, MonitorError, SentimentAnalysis, SentimentCapability, SentimentConfig,
    SentimentLabel,
};
use nonzero_ext::nonzero;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::common::{http_client, per_minute_limiter, DirectLimiter};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";

const SOURCE_NAME: &str = "gemini";

pub struct GeminiClassifier {
    http: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    rate_limiter: Arc<DirectLimiter>,
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClassifier {
    /// Creates a classifier with a 30 second request timeout.
    ///
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MonitorError> {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        let http = http_client(SOURCE_NAME, timeout)?;

        Ok(Self {
            http,
            base_url: GEMINI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: SecretString::from(api_key.into()),
            rate_limiter: per_minute_limiter(nonzero!(60u32)),
        })
    }

    /// Builds a classifier from configuration. Returns `None` without an API key.
    ///
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn from_config(config: &SentimentConfig) -> Result<Option<Self>, MonitorError> {
        let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let classifier = Self::with_timeout(key, Duration::from_secs(config.timeout_secs))?
            .with_base_url(config.base_url.clone())
            .with_model(config.model.clone());
        Ok(Some(classifier))
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.rate_limiter = per_minute_limiter(requests_per_minute);
        self
    }

    async fn generate(&self, prompt: &str) -> Result<String, MonitorError> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        debug!(model = %self.model, "POST generateContent");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await
            .map_err(|e| MonitorError::capability_unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MonitorError::capability_unavailable(format!(
                "Gemini API error {status}: {text}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MonitorError::invalid_response(SOURCE_NAME, e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| MonitorError::invalid_response(SOURCE_NAME, "no candidates returned"))
    }
}

#[async_trait]
impl SentimentCapability for GeminiClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentAnalysis, MonitorError> {
        let reply = self.generate(&build_prompt(text)).await?;
        parse_analysis(&reply)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    sentiment_score: f64,
    #[serde(default)]
    sentiment_label: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    market_impact: Option<String>,
    #[serde(default)]
    summary: String,
}

#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"Analyze the sentiment of the following financial news text and provide a structured response.

Text: "{text}"

Provide your analysis in the following JSON format:
{{
    "sentiment_score": <float between -1.0 (very negative) and 1.0 (very positive)>,
    "sentiment_label": <"positive", "negative", or "neutral">,
    "confidence": <float between 0.0 and 1.0>,
    "key_points": [<list of 2-3 key points from the text>],
    "market_impact": <"bullish", "bearish", or "neutral">,
    "summary": <one sentence summary>
}}

Only respond with valid JSON, no other text."#
    )
}

/// Removes a leading ```` ```json ```` or ```` ``` ```` fence and a trailing ```` ``` ````.
#[must_use]
pub fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parses a model reply into a clamped analysis.
///
/// # Errors
/// Returns [`MonitorError::InvalidResponse`] if the reply is not the expected JSON.
pub fn parse_analysis(reply: &str) -> Result<SentimentAnalysis, MonitorError> {
    let raw: RawAnalysis = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| MonitorError::invalid_response(SOURCE_NAME, e.to_string()))?;

    let label = raw
        .sentiment_label
        .as_deref()
        .map_or_else(|| SentimentLabel::from_score(raw.sentiment_score), SentimentLabel::parse_lenient);

    Ok(SentimentAnalysis {
        score: raw.sentiment_score,
        label,
        confidence: raw.confidence.unwrap_or(0.5),
        key_points: raw.key_points,
        market_impact: raw
            .market_impact
            .as_deref()
            .map_or(MarketImpact::Neutral, MarketImpact::parse_lenient),
        summary: raw.summary,
    }
    .clamped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply_body(text: &str) -> serde_json::Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_analysis_clamps_values() {
        let analysis = parse_analysis(
            r#"{"sentiment_score": 1.4, "sentiment_label": "positive", "confidence": 2.0,
                "key_points": ["beat"], "market_impact": "bullish", "summary": "Good"}"#,
        )
        .unwrap();
        assert_eq!(analysis.score, 1.0);
        assert_eq!(analysis.confidence, 1.0);
        assert_eq!(analysis.label, SentimentLabel::Positive);
        assert_eq!(analysis.market_impact, MarketImpact::Bullish);
    }

    #[test]
    fn test_parse_analysis_rejects_prose() {
        let err = parse_analysis("The sentiment is positive.").unwrap_err();
        assert!(matches!(err, MonitorError::InvalidResponse { .. }));
    }

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("Apple beats estimates");
        assert!(prompt.contains("Text: \"Apple beats estimates\""));
        assert!(prompt.contains("\"market_impact\""));
    }

    #[test]
    fn test_from_config_without_key_is_none() {
        let config = SentimentConfig::default();
        assert!(GeminiClassifier::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_classify_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
                "```json\n{\"sentiment_score\": -0.6, \"sentiment_label\": \"negative\", \
                 \"confidence\": 0.8, \"key_points\": [\"recall\"], \
                 \"market_impact\": \"bearish\", \"summary\": \"Recall hurts outlook\"}\n```",
            )))
            .mount(&mock_server)
            .await;

        let classifier = GeminiClassifier::new("test-key")
            .unwrap()
            .with_base_url(mock_server.uri());
        let analysis = classifier.classify("Tesla recall").await.unwrap();

        assert_eq!(analysis.score, -0.6);
        assert_eq!(analysis.label, SentimentLabel::Negative);
        assert_eq!(analysis.market_impact, MarketImpact::Bearish);
        assert_eq!(analysis.summary, "Recall hurts outlook");
    }

    #[tokio::test]
    async fn test_classify_http_error_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let classifier = GeminiClassifier::new("test-key")
            .unwrap()
            .with_base_url(mock_server.uri());
        let err = classifier.classify("anything").await.unwrap_err();

        assert!(matches!(err, MonitorError::CapabilityUnavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_classify_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_body("{}"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let classifier = GeminiClassifier::with_timeout("test-key", Duration::from_millis(50))
            .unwrap()
            .with_base_url(mock_server.uri());
        let err = classifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, MonitorError::CapabilityUnavailable(_)));
    }
}
