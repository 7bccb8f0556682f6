//! SendGrid v3 mail API channel.

use std::time::Duration;

use async_trait::async_trait;
use fintech_monitor_core::MonitorError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use super::{DeliveryError, SummaryChannel};

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

const CHANNEL: &str = "sendgrid";

pub struct SendGridEmailChannel {
    http: Client,
    base_url: String,
    api_key: SecretString,
    sender: String,
}

impl SendGridEmailChannel {
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        sender: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MonitorError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Configuration(format!("{CHANNEL} http client: {e}")))?;

        Ok(Self {
            http,
            base_url: SENDGRID_API_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            sender: sender.into(),
        })
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl SummaryChannel for SendGridEmailChannel {
    async fn send_summary(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let url = format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'));
        debug!(recipient, "POST mail/send");

        let payload = json!({
            "personalizations": [{ "to": [{ "email": recipient }] }],
            "from": { "email": self.sender },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                channel: CHANNEL,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                channel: CHANNEL,
                status: status.as_u16(),
                body,
            });
        }

        info!(recipient, "Email sent");
        Ok(())
    }

    fn name(&self) -> &str {
        CHANNEL
    }
}
