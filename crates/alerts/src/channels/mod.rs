//! Notification channels.
//!
//! A channel delivers one message to one recipient. The dispatcher decides
//! what to send and turns every outcome into a flag.

mod log_email;
mod sendgrid;
mod twilio;

pub use log_email::LogEmailChannel;
pub use sendgrid::{SendGridEmailChannel, SENDGRID_API_URL};
pub use twilio::{TwilioSmsChannel, TWILIO_API_URL};

use async_trait::async_trait;
use fintech_monitor_core::MonitorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{channel} request failed: {message}")]
    Transport {
        channel: &'static str,
        message: String,
    },

    #[error("{channel} rejected message: HTTP {status}: {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },
}

impl DeliveryError {
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Transport { channel, .. } | Self::Rejected { channel, .. } => channel,
        }
    }
}

impl From<DeliveryError> for MonitorError {
    fn from(err: DeliveryError) -> Self {
        MonitorError::delivery(err.channel(), err.to_string())
    }
}

/// Long-form channel used for the per-cycle summary.
#[async_trait]
pub trait SummaryChannel: Send + Sync {
    async fn send_summary(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError>;

    fn name(&self) -> &str;
}

/// Short-form channel used for individual high-severity alerts.
#[async_trait]
pub trait ShortMessageChannel: Send + Sync {
    async fn send_short(&self, recipient: &str, text: &str) -> Result<(), DeliveryError>;

    fn name(&self) -> &str;
}
