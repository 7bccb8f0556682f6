//! Notification dispatch for one alert cycle.
//!
//! One summary email covers the whole batch. SMS goes out for HIGH alerts
//! only, capped per cycle and truncated to the SMS length limit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use fintech_monitor_core::NotificationConfig;
use fintech_monitor_data::{Alert, Severity};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::channels::{
    LogEmailChannel, SendGridEmailChannel, ShortMessageChannel, SummaryChannel, TwilioSmsChannel,
};

pub const DEFAULT_MAX_SMS: usize = 3;
pub const SMS_MAX_CHARS: usize = 160;

const RULE_WIDTH: usize = 60;

/// Which alerts in a batch were delivered on which channel.
///
/// Indices refer to the slice passed to [`NotificationDispatcher::dispatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub email_sent: bool,
    pub sms_attempted: usize,
    pub sms_delivered: Vec<usize>,
}

impl DispatchReport {
    /// Returns `(email_sent, sms_sent)` for the alert at `index`.
    #[must_use]
    pub fn flags_for(&self, index: usize) -> (bool, bool) {
        (self.email_sent, self.sms_delivered.contains(&index))
    }
}

struct EmailRoute {
    channel: Arc<dyn SummaryChannel>,
    recipient: String,
}

/// A recipient without a channel logs each message instead of sending it.
struct SmsRoute {
    channel: Option<Arc<dyn ShortMessageChannel>>,
    recipient: String,
}

pub struct NotificationDispatcher {
    email: Option<EmailRoute>,
    sms: Option<SmsRoute>,
    max_sms: usize,
    sms_max_chars: usize,
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationDispatcher {
    /// A dispatcher with no channels configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            email: None,
            sms: None,
            max_sms: DEFAULT_MAX_SMS,
            sms_max_chars: SMS_MAX_CHARS,
        }
    }

    #[must_use]
    pub fn with_email(
        mut self,
        channel: Arc<dyn SummaryChannel>,
        recipient: impl Into<String>,
    ) -> Self {
        self.email = Some(EmailRoute {
            channel,
            recipient: recipient.into(),
        });
        self
    }

    #[must_use]
    pub fn with_sms(
        mut self,
        channel: Arc<dyn ShortMessageChannel>,
        recipient: impl Into<String>,
    ) -> Self {
        self.sms = Some(SmsRoute {
            channel: Some(channel),
            recipient: recipient.into(),
        });
        self
    }

    /// Keeps an SMS recipient with no channel behind it. Capped messages are
    /// still attempted, logged and reported as undelivered.
    #[must_use]
    pub fn with_sms_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.sms = Some(SmsRoute {
            channel: None,
            recipient: recipient.into(),
        });
        self
    }

    #[must_use]
    pub fn with_sms_limits(mut self, max_sms: usize, max_chars: usize) -> Self {
        self.max_sms = max_sms;
        self.sms_max_chars = max_chars;
        self
    }

    /// Builds channels from configuration.
    ///
    /// An email recipient without a SendGrid key gets the logging channel.
    /// An SMS recipient without complete Twilio credentials is kept log-only.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut dispatcher = Self::new().with_sms_limits(config.max_sms_per_cycle, config.sms_max_chars);

        if let Some(recipient) = non_empty(&config.email_recipient) {
            let channel: Arc<dyn SummaryChannel> = match non_empty(&config.sendgrid_api_key) {
                Some(key) => Arc::new(
                    SendGridEmailChannel::new(key, config.email_sender.clone(), timeout)?
                        .with_base_url(config.sendgrid_url.clone()),
                ),
                None => {
                    warn!("SendGrid key not configured, emails will be logged only");
                    Arc::new(LogEmailChannel)
                }
            };
            dispatcher = dispatcher.with_email(channel, recipient);
        }

        if let Some(recipient) = non_empty(&config.sms_recipient) {
            match (
                non_empty(&config.twilio_account_sid),
                non_empty(&config.twilio_auth_token),
                non_empty(&config.twilio_from_number),
            ) {
                (Some(sid), Some(token), Some(from)) => {
                    let channel = TwilioSmsChannel::new(sid, token, from, timeout)?
                        .with_base_url(config.twilio_url.clone());
                    info!("Twilio client initialized");
                    dispatcher = dispatcher.with_sms(Arc::new(channel), recipient);
                }
                _ => {
                    warn!("Twilio credentials not configured, SMS will be logged only");
                    dispatcher = dispatcher.with_sms_recipient(recipient);
                }
            }
        }

        Ok(dispatcher)
    }

    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }

    #[must_use]
    pub fn has_sms(&self) -> bool {
        self.sms.as_ref().is_some_and(|route| route.channel.is_some())
    }

    /// Sends one email. Returns false if no channel is configured or delivery fails.
    pub async fn send_email(&self, subject: &str, body: &str) -> bool {
        let Some(route) = &self.email else {
            info!(subject, "No email channel configured, skipping email");
            return false;
        };
        match route
            .channel
            .send_summary(&route.recipient, subject, body)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(channel = route.channel.name(), "Email send error: {}", e);
                false
            }
        }
    }

    /// Sends one SMS. Returns false if no channel is configured or delivery fails.
    pub async fn send_sms(&self, text: &str) -> bool {
        let Some((route, channel)) = self
            .sms
            .as_ref()
            .and_then(|route| route.channel.as_ref().map(|channel| (route, channel)))
        else {
            let recipient = self.sms.as_ref().map_or("", |route| route.recipient.as_str());
            info!(recipient, "SMS channel not available, logging SMS instead: {}", text);
            return false;
        };
        match channel.send_short(&route.recipient, text).await {
            Ok(()) => true,
            Err(e) => {
                error!(channel = channel.name(), "SMS send error: {}", e);
                false
            }
        }
    }

    /// Sends the summary email and the capped SMS batch.
    pub async fn dispatch(&self, alerts: &[Alert]) -> DispatchReport {
        let mut report = DispatchReport::default();
        if alerts.is_empty() {
            info!("No alerts to send");
            return report;
        }

        let high: Vec<(usize, &Alert)> = alerts
            .iter()
            .enumerate()
            .filter(|(_, a)| a.severity == Severity::High)
            .collect();
        let medium: Vec<&Alert> = alerts
            .iter()
            .filter(|a| a.severity == Severity::Medium)
            .collect();

        if self.email.is_some() {
            let subject = email_subject(high.len());
            let high_refs: Vec<&Alert> = high.iter().map(|(_, a)| *a).collect();
            let body = format_email_body(&high_refs, &medium);
            report.email_sent = self.send_email(&subject, &body).await;
        }

        if self.sms.is_some() {
            for (index, alert) in high.iter().take(self.max_sms) {
                report.sms_attempted += 1;
                let text = sms_text(&alert.message, self.sms_max_chars);
                if self.send_sms(&text).await {
                    report.sms_delivered.push(*index);
                }
            }
        }

        report
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[must_use]
pub fn email_subject(high_count: usize) -> String {
    format!("FinTech Alert: {high_count} High Priority Alerts")
}

/// Plain-text summary: HIGH alerts first, then MEDIUM, each with its time.
#[must_use]
pub fn format_email_body(high: &[&Alert], medium: &[&Alert]) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut body = String::from("FinTech Monitoring System - Alert Report\n");
    body.push_str(&heavy);
    body.push_str("\n\n");

    let section = |title: &str, alerts: &[&Alert], body: &mut String| {
        body.push_str(title);
        body.push('\n');
        body.push_str(&light);
        body.push('\n');
        for alert in alerts {
            body.push_str(&format!("• {}\n", alert.message));
            body.push_str(&format!(
                "  Time: {}\n\n",
                alert.triggered_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    };

    if !high.is_empty() {
        section("HIGH PRIORITY ALERTS:", high, &mut body);
    }
    if !medium.is_empty() {
        section("\nMEDIUM PRIORITY ALERTS:", medium, &mut body);
    }

    body.push('\n');
    body.push_str(&heavy);
    body.push('\n');
    body.push_str("View full details at your dashboard\n");
    body
}

/// `ALERT: {message}` cut to at most `max_chars` characters.
#[must_use]
pub fn sms_text(message: &str, max_chars: usize) -> String {
    format!("ALERT: {message}").chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::DeliveryError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use fintech_monitor_data::AlertDetails;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSms {
        sent: Mutex<Vec<String>>,
        fail_first: bool,
    }

    #[async_trait]
    impl ShortMessageChannel for RecordingSms {
        async fn send_short(&self, _recipient: &str, text: &str) -> Result<(), DeliveryError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(text.to_string());
            if self.fail_first && sent.len() == 1 {
                return Err(DeliveryError::Rejected {
                    channel: "test",
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[derive(Default)]
    struct RecordingEmail {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SummaryChannel for RecordingEmail {
        async fn send_summary(
            &self,
            _recipient: &str,
            subject: &str,
            body: &str,
        ) -> Result<(), DeliveryError> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn alert(symbol: &str, severity: Severity, message: &str) -> Alert {
        Alert::new(
            symbol,
            severity,
            message,
            AlertDetails::Price {
                price: dec!(100),
                change_percent: 6.0,
            },
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_sms_text_truncates_on_char_boundary() {
        let text = sms_text(&"é".repeat(300), SMS_MAX_CHARS);
        assert_eq!(text.chars().count(), 160);
        assert!(text.starts_with("ALERT: é"));
        assert_eq!(sms_text("short", 160), "ALERT: short");
    }

    #[test]
    fn test_email_body_layout() {
        let high = alert("AAPL", Severity::High, "AAPL increased by 6.00%");
        let medium = alert("TSLA", Severity::Medium, "TSLA has negative sentiment: -0.50 across 3 articles");
        let body = format_email_body(&[&high], &[&medium]);

        assert!(body.starts_with("FinTech Monitoring System - Alert Report\n"));
        let high_at = body.find("HIGH PRIORITY ALERTS:").unwrap();
        let medium_at = body.find("MEDIUM PRIORITY ALERTS:").unwrap();
        assert!(high_at < medium_at);
        assert!(body.contains("• AAPL increased by 6.00%\n  Time: 2025-03-01 12:00:00 UTC\n"));
        assert!(body.ends_with("View full details at your dashboard\n"));
    }

    #[tokio::test]
    async fn test_ten_high_alerts_send_three_sms() {
        let sms = Arc::new(RecordingSms::default());
        let dispatcher = NotificationDispatcher::new().with_sms(sms.clone(), "+15550000000");

        let long = "x".repeat(400);
        let alerts: Vec<Alert> = (0..10)
            .map(|i| alert(&format!("S{i}"), Severity::High, &long))
            .collect();
        let report = dispatcher.dispatch(&alerts).await;

        let sent = sms.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|s| s.chars().count() <= 160));
        assert_eq!(report.sms_attempted, 3);
        assert_eq!(report.sms_delivered, vec![0, 1, 2]);
        assert!(!report.email_sent);
    }

    #[tokio::test]
    async fn test_medium_only_batch_emails_without_sms() {
        let email = Arc::new(RecordingEmail::default());
        let sms = Arc::new(RecordingSms::default());
        let dispatcher = NotificationDispatcher::new()
            .with_email(email.clone(), "ops@example.com")
            .with_sms(sms.clone(), "+15550000000");

        let report = dispatcher
            .dispatch(&[alert("TSLA", Severity::Medium, "TSLA has negative sentiment")])
            .await;

        let sent = email.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "FinTech Alert: 0 High Priority Alerts");
        assert!(sms.sent.lock().unwrap().is_empty());
        assert!(report.email_sent);
        assert_eq!(report.flags_for(0), (true, false));
    }

    #[tokio::test]
    async fn test_failed_sms_does_not_stop_batch() {
        let sms = Arc::new(RecordingSms {
            fail_first: true,
            ..RecordingSms::default()
        });
        let dispatcher = NotificationDispatcher::new().with_sms(sms.clone(), "+15550000000");

        let alerts = vec![
            alert("AAPL", Severity::High, "a"),
            alert("MSFT", Severity::Medium, "b"),
            alert("TSLA", Severity::High, "c"),
        ];
        let report = dispatcher.dispatch(&alerts).await;

        assert_eq!(report.sms_attempted, 2);
        assert_eq!(report.sms_delivered, vec![2]);
    }

    #[tokio::test]
    async fn test_missing_channels_return_false() {
        let dispatcher = NotificationDispatcher::new();
        assert!(!dispatcher.send_email("subject", "body").await);
        assert!(!dispatcher.send_sms("text").await);

        let report = dispatcher
            .dispatch(&[alert("AAPL", Severity::High, "a")])
            .await;
        assert_eq!(report, DispatchReport::default());
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let email = Arc::new(RecordingEmail::default());
        let dispatcher = NotificationDispatcher::new().with_email(email.clone(), "ops@example.com");

        dispatcher.dispatch(&[]).await;
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_routes() {
        let config = NotificationConfig {
            email_recipient: Some("ops@example.com".to_string()),
            sms_recipient: Some("+15550000000".to_string()),
            ..NotificationConfig::default()
        };
        let dispatcher = NotificationDispatcher::from_config(&config).unwrap();

        // recipient without key falls back to the log channel
        assert!(dispatcher.has_email());
        // recipient without Twilio credentials has no channel
        assert!(!dispatcher.has_sms());
    }

    #[tokio::test]
    async fn test_sms_recipient_without_credentials_logs_each_capped_alert() {
        let config = NotificationConfig {
            sms_recipient: Some("+15550000000".to_string()),
            ..NotificationConfig::default()
        };
        let dispatcher = NotificationDispatcher::from_config(&config).unwrap();

        let alerts: Vec<Alert> = (0..5)
            .map(|i| alert(&format!("S{i}"), Severity::High, "price move"))
            .collect();
        let report = dispatcher.dispatch(&alerts).await;

        assert_eq!(report.sms_attempted, 3);
        assert!(report.sms_delivered.is_empty());
        assert!(!report.email_sent);
    }
}
