//! Client handles built once per process and shared with every service.

use std::sync::Arc;

use anyhow::Result;
use fintech_monitor_alerts::{AlertService, NotificationDispatcher};
use fintech_monitor_core::{AppConfig, SentimentCapability};
use fintech_monitor_data::{DatabaseClient, MonitorStore, Repositories};
use fintech_monitor_signals::{AnalyzerService, GeminiClassifier, ScraperService, SentimentSource};
use fintech_monitor_web_api::{AppState, ServiceKind};
use tracing::{info, warn};

pub struct ServiceContext {
    pub config: AppConfig,
    pub db: Option<Arc<DatabaseClient>>,
    pub store: Arc<dyn MonitorStore>,
    pub scraper: Arc<ScraperService>,
    pub analyzer: Arc<AnalyzerService>,
    pub alerts: Arc<AlertService>,
}

impl ServiceContext {
    /// Builds every client against Postgres. Nothing connects until first use.
    ///
    /// # Errors
    /// Returns an error if a provider or channel client cannot be built.
    pub fn connect(config: AppConfig) -> Result<Self> {
        let db = Arc::new(DatabaseClient::new(&config.database));
        let store: Arc<dyn MonitorStore> = Arc::new(Repositories::new(db.clone()));
        let mut ctx = Self::with_store(config, store)?;
        ctx.db = Some(db);
        Ok(ctx)
    }

    /// Builds every service against an arbitrary store.
    ///
    /// # Errors
    /// Returns an error if a provider or channel client cannot be built.
    pub fn with_store(config: AppConfig, store: Arc<dyn MonitorStore>) -> Result<Self> {
        let capability: Option<Arc<dyn SentimentCapability>> =
            match GeminiClassifier::from_config(&config.sentiment)? {
                Some(classifier) => {
                    info!("Gemini sentiment classifier configured");
                    Some(Arc::new(classifier))
                }
                None => {
                    warn!("Gemini API key not configured, using keyword fallback");
                    None
                }
            };

        let scraper = ScraperService::from_config(store.clone(), &config)?;
        let analyzer = AnalyzerService::new(store.clone(), SentimentSource::new(capability), &config);
        let dispatcher = NotificationDispatcher::from_config(&config.notifications)?;
        let alerts = AlertService::new(store.clone(), dispatcher, &config);

        Ok(Self {
            config,
            db: None,
            store,
            scraper: Arc::new(scraper),
            analyzer: Arc::new(analyzer),
            alerts: Arc::new(alerts),
        })
    }

    /// Creates tables if needed. A store that is down is logged, not fatal;
    /// every later call reconnects on its own.
    pub async fn prepare_schema(&self) {
        let Some(db) = &self.db else {
            return;
        };
        if let Err(e) = db.initialize_schema().await {
            warn!("Schema initialization skipped: {:#}", e);
        }
    }

    #[must_use]
    pub fn app_state(&self, service: ServiceKind) -> AppState {
        AppState {
            service,
            store: self.store.clone(),
            scraper: self.scraper.clone(),
            analyzer: self.analyzer.clone(),
            alerts: self.alerts.clone(),
            symbols: self.config.symbols.clone().into(),
            sentiment_summary_hours: self.config.windows.fusion_sentiment_hours,
        }
    }

    /// Listening port for `service` from configuration.
    #[must_use]
    pub fn default_port(&self, service: ServiceKind) -> u16 {
        let server = &self.config.server;
        match service {
            ServiceKind::Scraper => server.scraper_port,
            ServiceKind::Analyzer => server.analyzer_port,
            ServiceKind::Alert => server.alert_port,
            ServiceKind::All => server.combined_port,
        }
    }

    pub async fn shutdown(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}
