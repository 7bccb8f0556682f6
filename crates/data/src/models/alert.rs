//! Alert data model.
//!
//! An alert's type is derived from its details variant, so a price alert
//! can never carry sentiment details.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use fintech_monitor_core::FinalSignal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    PriceAlert,
    SentimentAlert,
    SignalAlert,
}

impl AlertType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAlert => "PRICE_ALERT",
            Self::SentimentAlert => "SENTIMENT_ALERT",
            Self::SignalAlert => "SIGNAL_ALERT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        }
    }

    /// # Errors
    /// Returns an error for anything other than HIGH or MEDIUM.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            other => bail!("unknown severity: {other}"),
        }
    }
}

/// Type-specific alert payload, stored as JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertDetails {
    Price {
        price: Decimal,
        change_percent: f64,
    },
    Sentiment {
        avg_sentiment: f64,
        article_count: i64,
    },
    Signal {
        signal: FinalSignal,
        composite_score: f64,
        reason: String,
    },
}

impl AlertDetails {
    #[must_use]
    pub const fn alert_type(&self) -> AlertType {
        match self {
            Self::Price { .. } => AlertType::PriceAlert,
            Self::Sentiment { .. } => AlertType::SentimentAlert,
            Self::Signal { .. } => AlertType::SignalAlert,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Assigned by the store on insert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub symbol: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub details: AlertDetails,
    pub triggered_at: DateTime<Utc>,
    pub email_sent: bool,
    pub sms_sent: bool,
}

impl Alert {
    pub fn new(
        symbol: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        details: AlertDetails,
        triggered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            alert_type: details.alert_type(),
            severity,
            message: message.into(),
            details,
            triggered_at,
            email_sent: false,
            sms_sent: false,
        }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.severity == Severity::High
    }
}

/// Raw `alerts` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertRow {
    pub id: i64,
    pub symbol: String,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub details: JsonValue,
    pub email_sent: bool,
    pub sms_sent: bool,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = anyhow::Error;

    fn try_from(row: AlertRow) -> Result<Self> {
        let details: AlertDetails = serde_json::from_value(row.details)
            .with_context(|| format!("invalid details on alert {}", row.id))?;
        if details.alert_type().as_str() != row.alert_type {
            bail!(
                "alert {} has type {} but {} details",
                row.id,
                row.alert_type,
                details.alert_type().as_str()
            );
        }
        Ok(Self {
            id: Some(row.id),
            symbol: row.symbol,
            alert_type: details.alert_type(),
            severity: Severity::parse(&row.severity)?,
            message: row.message,
            details,
            triggered_at: row.timestamp,
            email_sent: row.email_sent,
            sms_sent: row.sms_sent,
        })
    }
}
