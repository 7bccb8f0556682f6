//! HTTP plumbing shared by the provider clients.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use fintech_monitor_core::MonitorError;
use governor::{Quota, RateLimiter};
use reqwest::Client;

pub type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Builds a client whose every request is bounded by `timeout`.
///
/// # Errors
/// Returns [`MonitorError::Configuration`] if the TLS backend cannot be initialised.
pub fn http_client(source: &str, timeout: Duration) -> Result<Client, MonitorError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MonitorError::Configuration(format!("{source} http client: {e}")))
}

#[must_use]
pub fn per_minute_limiter(requests_per_minute: NonZeroU32) -> Arc<DirectLimiter> {
    Arc::new(RateLimiter::direct(Quota::per_minute(requests_per_minute)))
}

/// Maps a transport failure to a connectivity error for `source`.
pub fn transport_error(source: &str, err: &reqwest::Error) -> MonitorError {
    if err.is_timeout() {
        MonitorError::connectivity(source, format!("request timed out: {err}"))
    } else {
        MonitorError::connectivity(source, err.to_string())
    }
}
