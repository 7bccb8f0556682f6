//! Periodic cycle runner.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use fintech_monitor_web_api::ServiceKind;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::context::ServiceContext;

/// Runs `cycle` every `period`, starting immediately. A late tick is
/// delayed rather than bursted. Errors are logged and the loop continues.
pub fn spawn_periodic<F, Fut, T>(name: &'static str, period: Duration, mut cycle: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(task = name, every_secs = period.as_secs(), "Scheduler started");

        loop {
            ticker.tick().await;
            if let Err(e) = cycle().await {
                error!(task = name, "Scheduled cycle failed: {:#}", e);
            }
        }
    })
}

/// Spawns the periodic loops for `service`.
pub fn spawn_all(ctx: &ServiceContext, service: ServiceKind) -> Vec<JoinHandle<()>> {
    let schedule = ctx.config.scheduler;
    let symbols: std::sync::Arc<[String]> = ctx.config.symbols.clone().into();
    let mut handles = Vec::new();

    if service.includes(ServiceKind::Scraper) {
        let scraper = ctx.scraper.clone();
        let symbols = symbols.clone();
        handles.push(spawn_periodic(
            "scrape",
            Duration::from_secs(schedule.scrape_interval_secs.max(1)),
            move || {
                let scraper = scraper.clone();
                let symbols = symbols.clone();
                async move { scraper.run_cycle(&symbols).await }
            },
        ));
    }

    if service.includes(ServiceKind::Analyzer) {
        let analyzer = ctx.analyzer.clone();
        let symbols = symbols.clone();
        handles.push(spawn_periodic(
            "analyze",
            Duration::from_secs(schedule.analyze_interval_secs.max(1)),
            move || {
                let analyzer = analyzer.clone();
                let symbols = symbols.clone();
                async move { analyzer.run_cycle(&symbols).await }
            },
        ));
    }

    if service.includes(ServiceKind::Alert) {
        let alerts = ctx.alerts.clone();
        handles.push(spawn_periodic(
            "check-alerts",
            Duration::from_secs(schedule.alert_interval_secs.max(1)),
            move || {
                let alerts = alerts.clone();
                async move { alerts.run_cycle().await }
            },
        ));
    }

    handles
}
