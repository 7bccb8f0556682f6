//! Twilio Messages REST API channel.

use std::time::Duration;

use async_trait::async_trait;
use fintech_monitor_core::MonitorError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use super::{DeliveryError, ShortMessageChannel};

pub const TWILIO_API_URL: &str = "https://api.twilio.com";

const CHANNEL: &str = "twilio";

pub struct TwilioSmsChannel {
    http: Client,
    base_url: String,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    sid: Option<String>,
}

impl TwilioSmsChannel {
    /// # Errors
    /// Returns [`MonitorError::Configuration`] if the HTTP client cannot be built.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MonitorError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::Configuration(format!("{CHANNEL} http client: {e}")))?;

        Ok(Self {
            http,
            base_url: TWILIO_API_URL.to_string(),
            account_sid: account_sid.into(),
            auth_token: SecretString::from(auth_token.into()),
            from_number: from_number.into(),
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
impl ShortMessageChannel for TwilioSmsChannel {
    async fn send_short(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("To", recipient),
                ("From", self.from_number.as_str()),
                ("Body", text),
            ])
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

        let sid = response
            .json::<MessageResponse>()
            .await
            .ok()
            .and_then(|m| m.sid)
            .unwrap_or_default();
        info!(sid = %sid, "SMS sent successfully");
        Ok(())
    }

    fn name(&self) -> &str {
        CHANNEL
    }
}
