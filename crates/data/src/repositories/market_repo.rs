//! Market quote repository.

use std::sync::Arc;

use anyhow::Result;

use crate::database::DatabaseClient;
use crate::models::PriceObservation;

/// Repository for `market_data` rows.
#[derive(Clone)]
pub struct MarketDataRepository {
    db: Arc<DatabaseClient>,
}

impl MarketDataRepository {
    #[must_use]
    pub fn new(db: Arc<DatabaseClient>) -> Self {
        Self { db }
    }

    /// Inserts a single observation.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or the insert fails.
    pub async fn insert(&self, observation: &PriceObservation) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO market_data
                (symbol, price, change_amount, change_percent, volume, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&observation.symbol)
        .bind(observation.price)
        .bind(observation.change_amount)
        .bind(observation.change_percent)
        .bind(observation.volume)
        .bind(observation.timestamp)
        .execute(&pool)
        .await?;

        Ok(())
    }

    /// Newest-first observations for a symbol.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_recent(&self, symbol: &str, limit: i64) -> Result<Vec<PriceObservation>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, PriceObservation>(
            r#"
            SELECT symbol, price, change_amount, change_percent, volume, timestamp
            FROM market_data
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

    /// Latest observation per symbol.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_latest_per_symbol(&self) -> Result<Vec<PriceObservation>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, PriceObservation>(
            r#"
            SELECT DISTINCT ON (symbol)
                symbol, price, change_amount, change_percent, volume, timestamp
            FROM market_data
            ORDER BY symbol, timestamp DESC
            "#,
        )
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }
}
