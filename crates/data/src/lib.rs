//! Storage for the fintech monitoring pipeline.
//!
//! This crate provides:
//! - [`DatabaseClient`], a lazily connected Postgres pool with reconnect-on-stale
//! - Data models for quotes, articles, sentiment, signals and alerts
//! - Repositories for typed table access
//! - Store traits implemented by the repositories and by [`MemoryStore`]

pub mod database;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use database::{retry_with_backoff, DatabaseClient};
pub use memory::{MemoryStore, Table};

pub use models::{
    Alert, AlertDetails, AlertRow, AlertType, NewArticle, NewsArticle, PriceObservation,
    SentimentRecord, SentimentSummary, Severity, TradingSignalRecord,
};

pub use repositories::{
    AlertRepository, MarketDataRepository, NewsArticleRepository, Repositories,
    SentimentRepository, TradingSignalRepository,
};

pub use store::{
    AlertStore, MarketDataStore, MonitorStore, NewsStore, SentimentStore, SignalStore,
    StoreHealth,
};
