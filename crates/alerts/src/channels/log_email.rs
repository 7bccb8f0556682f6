use async_trait::async_trait;
use tracing::info;

use super::{DeliveryError, SummaryChannel};

/// Writes the email to the log instead of sending it.
///
/// Used when a recipient is configured without mail credentials. Every
/// send reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailChannel;

#[async_trait]
impl SummaryChannel for LogEmailChannel {
    async fn send_summary(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        info!("{}", "=".repeat(60));
        info!("EMAIL NOTIFICATION");
        info!("To: {}", recipient);
        info!("Subject: {}", subject);
        info!("Body:\n{}", body);
        info!("{}", "=".repeat(60));
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
