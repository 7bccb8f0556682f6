//! Trading signal repository. Append-only.

use std::sync::Arc;

use anyhow::Result;

use crate::database::DatabaseClient;
use crate::models::TradingSignalRecord;

#[derive(Clone)]
pub struct TradingSignalRepository {
    db: Arc<DatabaseClient>,
}

impl TradingSignalRepository {
    #[must_use]
    pub fn new(db: Arc<DatabaseClient>) -> Self {
        Self { db }
    }

    /// Appends a signal row.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, record: &TradingSignalRecord) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO trading_signals
                (symbol, signal, composite_score, price_change, sentiment_score,
                 confidence, reason, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&record.symbol)
        .bind(&record.signal)
        .bind(record.composite_score)
        .bind(record.price_change)
        .bind(record.sentiment_score)
        .bind(record.confidence)
        .bind(&record.reason)
        .bind(record.timestamp)
        .execute(&pool)
        .await?;

        Ok(())
    }

    /// Latest signal per symbol.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_latest_per_symbol(&self) -> Result<Vec<TradingSignalRecord>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, TradingSignalRecord>(
            r#"
            SELECT DISTINCT ON (symbol)
                symbol, signal, composite_score, price_change, sentiment_score,
                confidence, reason, timestamp
            FROM trading_signals
            ORDER BY symbol, timestamp DESC
            "#,
        )
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }

    /// Signal history for a symbol, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_recent(&self, symbol: &str, limit: i64) -> Result<Vec<TradingSignalRecord>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, TradingSignalRecord>(
            r#"
            SELECT symbol, signal, composite_score, price_change, sentiment_score,
                   confidence, reason, timestamp
            FROM trading_signals
            WHERE symbol = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }
}
