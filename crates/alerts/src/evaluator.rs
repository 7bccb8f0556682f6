//! Alert condition scans.
//!
//! Three independent scans run against the store. A failing scan is logged
//! and recorded in the [`EvaluationReport`]; the others still run.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use fintech_monitor_core::{AppConfig, ThresholdConfig, WindowConfig};
use fintech_monitor_data::{
    Alert, AlertDetails, MonitorStore, PriceObservation, SentimentSummary, Severity,
    TradingSignalRecord,
};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Price,
    Sentiment,
    Signal,
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Price => "price",
            Self::Sentiment => "sentiment",
            Self::Signal => "signal",
        };
        f.write_str(name)
    }
}

/// Result of a single scan.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(Vec<Alert>),
    Failed(anyhow::Error),
}

impl From<Result<Vec<Alert>>> for ScanOutcome {
    fn from(result: Result<Vec<Alert>>) -> Self {
        match result {
            Ok(alerts) => Self::Completed(alerts),
            Err(e) => Self::Failed(e),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub scan: ScanKind,
    pub error: String,
}

/// Alerts from every completed scan, in price, sentiment, signal order.
#[derive(Debug, Default)]
pub struct EvaluationReport {
    pub alerts: Vec<Alert>,
    pub failures: Vec<ScanFailure>,
}

impl EvaluationReport {
    fn record(&mut self, scan: ScanKind, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Completed(alerts) => {
                info!("Found {} {} alerts", alerts.len(), scan);
                self.alerts.extend(alerts);
            }
            ScanOutcome::Failed(e) => {
                error!("Error checking {} alerts: {:#}", scan, e);
                self.failures.push(ScanFailure {
                    scan,
                    error: format!("{e:#}"),
                });
            }
        }
    }
}

pub struct AlertConditionEvaluator {
    store: Arc<dyn MonitorStore>,
    thresholds: ThresholdConfig,
    windows: WindowConfig,
}

impl AlertConditionEvaluator {
    #[must_use]
    pub fn new(store: Arc<dyn MonitorStore>, config: &AppConfig) -> Self {
        Self {
            store,
            thresholds: config.thresholds,
            windows: config.windows,
        }
    }

    pub async fn scan_prices(&self) -> ScanOutcome {
        self.store
            .latest_observations()
            .await
            .map(|latest| price_alerts(&latest, self.thresholds.price_change_threshold))
            .into()
    }

    pub async fn scan_sentiment(&self, now: DateTime<Utc>) -> ScanOutcome {
        let since = now - Duration::hours(self.windows.alert_sentiment_hours);
        self.store
            .sentiment_summaries(since)
            .await
            .map(|summaries| {
                sentiment_alerts(
                    &summaries,
                    self.thresholds.sentiment_threshold,
                    self.windows.min_sentiment_articles,
                    now,
                )
            })
            .into()
    }

    pub async fn scan_signals(&self, now: DateTime<Utc>) -> ScanOutcome {
        let since = now - Duration::hours(self.windows.signal_alert_hours);
        self.store
            .latest_signals()
            .await
            .map(|latest| signal_alerts(&latest, since))
            .into()
    }

    /// Runs all three scans.
    pub async fn evaluate(&self, now: DateTime<Utc>) -> EvaluationReport {
        let mut report = EvaluationReport::default();
        report.record(ScanKind::Price, self.scan_prices().await);
        report.record(ScanKind::Sentiment, self.scan_sentiment(now).await);
        report.record(ScanKind::Signal, self.scan_signals(now).await);
        report
    }
}

/// HIGH alerts for latest observations whose move exceeds `threshold` percent.
#[must_use]
pub fn price_alerts(latest: &[PriceObservation], threshold: f64) -> Vec<Alert> {
    latest
        .iter()
        .filter(|obs| obs.change_percent.abs() > threshold)
        .map(|obs| {
            let direction = if obs.change_percent > 0.0 {
                "increased"
            } else {
                "decreased"
            };
            Alert::new(
                &obs.symbol,
                Severity::High,
                format!(
                    "{} {} by {:.2}%",
                    obs.symbol,
                    direction,
                    obs.change_percent.abs()
                ),
                AlertDetails::Price {
                    price: obs.price,
                    change_percent: obs.change_percent,
                },
                obs.timestamp,
            )
        })
        .collect()
}

/// MEDIUM alerts for symbols with enough articles and a mean below `threshold`.
#[must_use]
pub fn sentiment_alerts(
    summaries: &[SentimentSummary],
    threshold: f64,
    min_articles: i64,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    summaries
        .iter()
        .filter(|s| s.article_count >= min_articles && s.avg_sentiment < threshold)
        .map(|s| {
            Alert::new(
                &s.symbol,
                Severity::Medium,
                format!(
                    "{} has negative sentiment: {:.2} across {} articles",
                    s.symbol, s.avg_sentiment, s.article_count
                ),
                AlertDetails::Sentiment {
                    avg_sentiment: s.avg_sentiment,
                    article_count: s.article_count,
                },
                now,
            )
        })
        .collect()
}

/// HIGH alerts for latest signals newer than `since` that are STRONG_BUY or STRONG_SELL.
#[must_use]
pub fn signal_alerts(latest: &[TradingSignalRecord], since: DateTime<Utc>) -> Vec<Alert> {
    latest
        .iter()
        .filter(|record| record.timestamp > since)
        .filter_map(|record| match record.final_signal() {
            Ok(signal) => Some((record, signal)),
            Err(e) => {
                warn!(symbol = %record.symbol, "Skipping signal row: {}", e);
                None
            }
        })
        .filter(|(_, signal)| signal.is_strong())
        .map(|(record, signal)| {
            Alert::new(
                &record.symbol,
                Severity::High,
                format!(
                    "{}: {} signal detected (score: {:.2})",
                    record.symbol,
                    signal.as_str(),
                    record.composite_score
                ),
                AlertDetails::Signal {
                    signal,
                    composite_score: record.composite_score,
                    reason: record.reason.clone(),
                },
                record.timestamp,
            )
        })
        .collect()
}
