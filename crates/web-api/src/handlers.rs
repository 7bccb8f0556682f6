use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use fintech_monitor_alerts::AlertCycleReport;
use fintech_monitor_core::FusedSignal;
use fintech_monitor_data::{
    Alert, NewsArticle, PriceObservation, SentimentSummary, TradingSignalRecord,
};
use fintech_monitor_signals::ScrapeReport;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::state::AppState;

const NEWS_LIMIT: i64 = 10;
const SIGNAL_LIMIT: i64 = 10;
const RECENT_ALERT_LIMIT: i64 = 20;
const SYMBOL_ALERT_LIMIT: i64 = 10;

/// Any handler failure, rendered as `500 {"status": "error", "message": ...}`.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "message": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub status: &'static str,
    pub result: ScrapeReport,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub sentiment_analyses: usize,
    pub trading_signals: usize,
    pub signals: Vec<FusedSignal>,
}

#[derive(Debug, Serialize)]
pub struct AlertCheckResponse {
    pub status: &'static str,
    pub alerts_found: usize,
    pub alerts: Vec<Alert>,
    pub failed_scans: Vec<fintech_monitor_alerts::ScanFailure>,
}

impl From<AlertCycleReport> for AlertCheckResponse {
    fn from(report: AlertCycleReport) -> Self {
        Self {
            status: "success",
            alerts_found: report.alerts.len(),
            alerts: report.alerts,
            failed_scans: report.failed_scans,
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.service.as_str(),
    })
}

// ==================== Scraper ====================

/// Runs one scraping cycle.
///
/// # Errors
/// Returns 500 if the store is unreachable.
pub async fn trigger_scrape(State(state): State<AppState>) -> ApiResult<ScrapeResponse> {
    let result = state.scraper.run_cycle(&state.symbols).await?;
    Ok(Json(ScrapeResponse {
        status: "success",
        result,
    }))
}

pub async fn latest_data(State(state): State<AppState>) -> ApiResult<Vec<PriceObservation>> {
    Ok(Json(state.store.latest_observations().await?))
}

pub async fn news_for_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<NewsArticle>> {
    let articles = state
        .store
        .recent_articles(&symbol.to_uppercase(), NEWS_LIMIT)
        .await?;
    Ok(Json(articles))
}

// ==================== Analyzer ====================

/// Runs one analysis cycle.
///
/// # Errors
/// Returns 500 if the store is unreachable or articles cannot be loaded.
pub async fn trigger_analysis(State(state): State<AppState>) -> ApiResult<AnalyzeResponse> {
    let report = state.analyzer.run_cycle(&state.symbols).await?;
    Ok(Json(AnalyzeResponse {
        status: "success",
        sentiment_analyses: report.sentiment_analyses,
        trading_signals: report.trading_signals,
        signals: report.signals,
    }))
}

pub async fn sentiment_summary(State(state): State<AppState>) -> ApiResult<Vec<SentimentSummary>> {
    let since = Utc::now() - Duration::hours(state.sentiment_summary_hours);
    Ok(Json(state.store.sentiment_summaries(since).await?))
}

pub async fn signals_for_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<TradingSignalRecord>> {
    let signals = state
        .store
        .recent_signals(&symbol.to_uppercase(), SIGNAL_LIMIT)
        .await?;
    Ok(Json(signals))
}

// ==================== Alerts ====================

/// Runs one alert cycle.
///
/// # Errors
/// Returns 500 if the store is unreachable.
pub async fn trigger_alert_check(State(state): State<AppState>) -> ApiResult<AlertCheckResponse> {
    let report = state.alerts.run_cycle().await?;
    Ok(Json(report.into()))
}

pub async fn recent_alerts(State(state): State<AppState>) -> ApiResult<Vec<Alert>> {
    Ok(Json(state.store.recent_alerts(RECENT_ALERT_LIMIT).await?))
}

pub async fn alerts_for_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Vec<Alert>> {
    let alerts = state
        .store
        .alerts_for_symbol(&symbol.to_uppercase(), SYMBOL_ALERT_LIMIT)
        .await?;
    Ok(Json(alerts))
}
