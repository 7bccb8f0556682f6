use crate::handlers;
use crate::state::{AppState, ServiceKind};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn service(&self) -> ServiceKind {
        self.state.service
    }

    /// Mounts `/health` plus the routes of the configured service, or of
    /// every service for [`ServiceKind::All`].
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let service = self.state.service;
        let mut router = Router::new().route("/health", get(handlers::health));

        if service.includes(ServiceKind::Scraper) {
            router = router
                .route("/scrape", post(handlers::trigger_scrape))
                .route("/api/latest-data", get(handlers::latest_data))
                .route("/api/news/:symbol", get(handlers::news_for_symbol));
        }
        if service.includes(ServiceKind::Analyzer) {
            router = router
                .route("/analyze", post(handlers::trigger_analysis))
                .route("/api/sentiment-summary", get(handlers::sentiment_summary))
                .route("/api/signals/:symbol", get(handlers::signals_for_symbol));
        }
        if service.includes(ServiceKind::Alert) {
            router = router
                .route("/check-alerts", post(handlers::trigger_alert_check))
                .route("/api/alerts/recent", get(handlers::recent_alerts))
                .route("/api/alerts/:symbol", get(handlers::alerts_for_symbol));
        }

        router
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(service = %self.state.service, "Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
