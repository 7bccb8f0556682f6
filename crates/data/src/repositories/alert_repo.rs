//! Alert repository.
//!
//! Alerts are an audit trail: rows are inserted once and only their
//! delivery flags are updated afterwards.

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::database::DatabaseClient;
use crate::models::{Alert, AlertRow};

#[derive(Clone)]
pub struct AlertRepository {
    db: Arc<DatabaseClient>,
}

impl AlertRepository {
    #[must_use]
    pub fn new(db: Arc<DatabaseClient>) -> Self {
        Self { db }
    }

    /// Inserts an alert and returns the generated id.
    ///
    /// # Errors
    /// Returns an error if the details cannot be encoded or the insert fails.
    pub async fn insert(&self, alert: &Alert) -> Result<i64> {
        let pool = self.db.pool().await?;
        let details = serde_json::to_value(&alert.details)?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO alerts
                (symbol, alert_type, severity, message, details,
                 triggered, email_sent, sms_sent, timestamp)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&alert.symbol)
        .bind(alert.alert_type.as_str())
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(details)
        .bind(alert.email_sent)
        .bind(alert.sms_sent)
        .bind(alert.triggered_at)
        .fetch_one(&pool)
        .await?;

        Ok(id)
    }

    /// Sets delivery flags. A flag already true stays true.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn mark_delivery(&self, id: i64, email_sent: bool, sms_sent: bool) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query(
            r#"
            UPDATE alerts
            SET email_sent = email_sent OR $2,
                sms_sent = sms_sent OR $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(email_sent)
        .bind(sms_sent)
        .execute(&pool)
        .await?;

        Ok(())
    }

    /// Most recent alerts across all symbols.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_recent(&self, limit: i64) -> Result<Vec<Alert>> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT id, symbol, alert_type, severity, message, details,
                   email_sent, sms_sent, timestamp
            FROM alerts
            ORDER BY timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&pool)
        .await?;

        Ok(convert_rows(rows))
    }

    /// Most recent alerts for a symbol.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_symbol(&self, symbol: &str, limit: i64) -> Result<Vec<Alert>> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT id, symbol, alert_type, severity, message, details,
                   email_sent, sms_sent, timestamp
            FROM alerts
            WHERE symbol = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&pool)
        .await?;

        Ok(convert_rows(rows))
    }
}

// Rows written by older builds may not decode; skip them rather than fail the listing.
fn convert_rows(rows: Vec<AlertRow>) -> Vec<Alert> {
    rows.into_iter()
        .filter_map(|row| match Alert::try_from(row) {
            Ok(alert) => Some(alert),
            Err(e) => {
                warn!("Skipping undecodable alert row: {:#}", e);
                None
            }
        })
        .collect()
}
