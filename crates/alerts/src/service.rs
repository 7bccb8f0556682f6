//! Alert service: evaluate, persist, notify, record delivery.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use fintech_monitor_core::AppConfig;
use fintech_monitor_data::{Alert, MonitorStore};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::dispatcher::{DispatchReport, NotificationDispatcher};
use crate::evaluator::{AlertConditionEvaluator, ScanFailure};

#[derive(Debug, Clone, Serialize)]
pub struct AlertCycleReport {
    pub alerts: Vec<Alert>,
    pub failed_scans: Vec<ScanFailure>,
    pub dispatch: DispatchReport,
}

pub struct AlertService {
    store: Arc<dyn MonitorStore>,
    evaluator: AlertConditionEvaluator,
    dispatcher: NotificationDispatcher,
}

impl AlertService {
    #[must_use]
    pub fn new(
        store: Arc<dyn MonitorStore>,
        dispatcher: NotificationDispatcher,
        config: &AppConfig,
    ) -> Self {
        Self {
            evaluator: AlertConditionEvaluator::new(store.clone(), config),
            store,
            dispatcher,
        }
    }

    /// # Errors
    /// Fails only if the store is unreachable at cycle start.
    pub async fn run_cycle(&self) -> Result<AlertCycleReport> {
        info!("{}", "=".repeat(60));
        info!("Starting alert check cycle");

        if let Err(e) = self.store.ensure_connected().await {
            warn!("Store unavailable, aborting alert cycle");
            return Err(e);
        }

        let evaluation = self.evaluator.evaluate(Utc::now()).await;
        let mut alerts = evaluation.alerts;

        if alerts.is_empty() {
            info!("No alerts triggered");
        } else {
            info!("Found {} alerts", alerts.len());
            for alert in &mut alerts {
                match self.store.insert_alert(alert).await {
                    Ok(id) => alert.id = Some(id),
                    Err(e) => error!(symbol = %alert.symbol, "Error saving alert: {:#}", e),
                }
            }
        }

        let dispatch = self.dispatcher.dispatch(&alerts).await;
        self.record_delivery(&mut alerts, &dispatch).await;

        info!("Alert check cycle complete");
        info!("{}", "=".repeat(60));

        Ok(AlertCycleReport {
            alerts,
            failed_scans: evaluation.failures,
            dispatch,
        })
    }

    async fn record_delivery(&self, alerts: &mut [Alert], dispatch: &DispatchReport) {
        for (index, alert) in alerts.iter_mut().enumerate() {
            let (email_sent, sms_sent) = dispatch.flags_for(index);
            if !email_sent && !sms_sent {
                continue;
            }
            alert.email_sent = email_sent;
            alert.sms_sent = sms_sent;

            let Some(id) = alert.id else {
                continue;
            };
            if let Err(e) = self.store.mark_delivery(id, email_sent, sms_sent).await {
                error!(alert_id = id, "Error recording delivery: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{DeliveryError, ShortMessageChannel, SummaryChannel};
    use async_trait::async_trait;
    use fintech_monitor_core::MonitorError;
    use fintech_monitor_data::{
        MarketDataStore, MemoryStore, PriceObservation, SentimentRecord, SentimentStore, Table,
    };
    use rust_decimal_macros::dec;

    struct AcceptAll;

    #[async_trait]
    impl SummaryChannel for AcceptAll {
        async fn send_summary(&self, _: &str, _: &str, _: &str) -> Result<(), DeliveryError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "accept"
        }
    }

    struct RejectAll;

    #[async_trait]
    impl ShortMessageChannel for RejectAll {
        async fn send_short(&self, _: &str, _: &str) -> Result<(), DeliveryError> {
            Err(DeliveryError::Transport {
                channel: "reject",
                message: "unreachable".to_string(),
            })
        }

        fn name(&self) -> &str {
            "reject"
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        store
            .insert_observation(&PriceObservation::new("AAPL", dec!(190), 6.5, 1, now))
            .await
            .unwrap();
        for id in 1..=3 {
            store
                .insert_sentiment(&SentimentRecord {
                    article_id: id,
                    symbol: "TSLA".to_string(),
                    score: -0.7,
                    label: "negative".to_string(),
                    confidence: 0.8,
                    key_points: vec![],
                    market_impact: "bearish".to_string(),
                    summary: String::new(),
                    analyzed_at: now,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_cycle_persists_and_flags_delivery() {
        let store = seeded_store().await;
        let dispatcher = NotificationDispatcher::new()
            .with_email(Arc::new(AcceptAll), "ops@example.com")
            .with_sms(Arc::new(RejectAll), "+15550000000");
        let service = AlertService::new(store.clone(), dispatcher, &AppConfig::default());

        let report = service.run_cycle().await.unwrap();
        assert_eq!(report.alerts.len(), 2);
        assert_eq!(report.dispatch.sms_attempted, 1);

        let stored = store.alerts();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|a| a.email_sent));
        // SMS delivery failed, so the flag stays false
        assert!(stored.iter().all(|a| !a.sms_sent));
    }

    #[tokio::test]
    async fn test_no_channels_leaves_flags_unset() {
        let store = seeded_store().await;
        let service =
            AlertService::new(store.clone(), NotificationDispatcher::new(), &AppConfig::default());

        service.run_cycle().await.unwrap();
        assert!(store.alerts().iter().all(|a| !a.email_sent && !a.sms_sent));
    }

    #[tokio::test]
    async fn test_alert_table_failure_still_dispatches() {
        let store = seeded_store().await;
        store.fail_table(Table::Alerts);
        let dispatcher =
            NotificationDispatcher::new().with_email(Arc::new(AcceptAll), "ops@example.com");
        let service = AlertService::new(store, dispatcher, &AppConfig::default());

        let report = service.run_cycle().await.unwrap();
        assert!(report.dispatch.email_sent);
        assert!(report.alerts.iter().all(|a| a.id.is_none()));
    }

    #[tokio::test]
    async fn test_offline_store_fails_cycle() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let service = AlertService::new(store, NotificationDispatcher::new(), &AppConfig::default());

        let err = service.run_cycle().await.unwrap_err();
        assert!(err
            .downcast_ref::<MonitorError>()
            .is_some_and(MonitorError::is_connectivity));
    }
}
