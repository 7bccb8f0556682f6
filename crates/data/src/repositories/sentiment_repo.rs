//! Sentiment analysis repository.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::database::DatabaseClient;
use crate::models::{SentimentRecord, SentimentSummary};

#[derive(Clone)]
pub struct SentimentRepository {
    db: Arc<DatabaseClient>,
}

impl SentimentRepository {
    #[must_use]
    pub fn new(db: Arc<DatabaseClient>) -> Self {
        Self { db }
    }

    /// Inserts one record. An article is only ever analyzed once.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including a second record for
    /// the same article.
    pub async fn insert(&self, record: &SentimentRecord) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO sentiment_analysis
                (article_id, symbol, sentiment_score, sentiment_label, confidence,
                 key_points, market_impact, summary, analyzed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.article_id)
        .bind(&record.symbol)
        .bind(record.score)
        .bind(&record.label)
        .bind(record.confidence)
        .bind(&record.key_points)
        .bind(&record.market_impact)
        .bind(&record.summary)
        .bind(record.analyzed_at)
        .execute(&pool)
        .await?;

        Ok(())
    }

    /// Records for a symbol analyzed after `since`.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SentimentRecord>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, SentimentRecord>(
            r#"
            SELECT article_id, symbol, sentiment_score, sentiment_label, confidence,
                   key_points, market_impact, summary, analyzed_at
            FROM sentiment_analysis
            WHERE symbol = $1 AND analyzed_at > $2
            ORDER BY analyzed_at DESC
            "#,
        )
        .bind(symbol)
        .bind(since)
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }

    /// Per-symbol mean score, count and mean confidence since `since`.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_summaries(&self, since: DateTime<Utc>) -> Result<Vec<SentimentSummary>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, SentimentSummary>(
            r#"
            SELECT symbol,
                   AVG(sentiment_score)::DOUBLE PRECISION AS avg_sentiment,
                   COUNT(*) AS article_count,
                   AVG(confidence)::DOUBLE PRECISION AS avg_confidence
            FROM sentiment_analysis
            WHERE analyzed_at > $1
            GROUP BY symbol
            ORDER BY symbol
            "#,
        )
        .bind(since)
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }
}
