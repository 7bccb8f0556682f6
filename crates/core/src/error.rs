//! Error taxonomy for the monitoring pipeline.
//!
//! Only store connectivity at the start of a cycle is fatal. Insufficient
//! data resolves to a neutral default, an unavailable sentiment capability
//! resolves to the keyword heuristic, and delivery failures are logged per
//! message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Store or provider could not be reached.
    #[error("connectivity error ({target}): {message}")]
    Connectivity {
        /// What was being reached, e.g. `postgres` or `alpha_vantage`.
        target: String,
        message: String,
    },

    /// Not enough history to derive a signal.
    #[error("insufficient data for {symbol}: need {required}, have {available}")]
    InsufficientData {
        symbol: String,
        required: usize,
        available: usize,
    },

    /// Sentiment classifier missing, erroring, or returning garbage.
    #[error("sentiment capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Notification channel failure.
    #[error("delivery failed on {channel}: {message}")]
    Delivery { channel: String, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider returned a payload that could not be interpreted.
    #[error("invalid response from {source_name}: {message}")]
    InvalidResponse {
        source_name: String,
        message: String,
    },
}

impl MonitorError {
    pub fn connectivity(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connectivity {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn insufficient_data(symbol: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            symbol: symbol.into(),
            required,
            available,
        }
    }

    pub fn capability_unavailable(message: impl Into<String>) -> Self {
        Self::CapabilityUnavailable(message.into())
    }

    pub fn delivery(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            channel: channel.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// Returns true for kinds that are resolved in place and never fail a cycle.
    #[must_use]
    pub fn is_locally_resolved(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::CapabilityUnavailable(_) | Self::Delivery { .. }
        )
    }
}

/// Returns true if any error in the chain is a [`MonitorError::Connectivity`].
#[must_use]
pub fn is_connectivity_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<MonitorError>()
            .is_some_and(MonitorError::is_connectivity)
    })
}
