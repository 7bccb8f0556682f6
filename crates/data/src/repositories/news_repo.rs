//! News article repository.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::database::DatabaseClient;
use crate::models::{NewArticle, NewsArticle};

/// Repository for `news_articles` rows.
#[derive(Clone)]
pub struct NewsArticleRepository {
    db: Arc<DatabaseClient>,
}

impl NewsArticleRepository {
    #[must_use]
    pub fn new(db: Arc<DatabaseClient>) -> Self {
        Self { db }
    }

    /// Inserts an article, ignoring duplicates by URL.
    ///
    /// Returns true if a row was written.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, article: &NewArticle) -> Result<bool> {
        let pool = self.db.pool().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO news_articles
                (symbol, title, description, content, source, url, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&article.symbol)
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.content)
        .bind(&article.source)
        .bind(&article.url)
        .bind(article.published_at)
        .execute(&pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Articles fetched after `since` without a sentiment record.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_unanalyzed(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<NewsArticle>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, NewsArticle>(
            r#"
            SELECT na.id, na.symbol, na.title, na.description, na.content,
                   na.source, na.url, na.published_at, na.fetched_at
            FROM news_articles na
            LEFT JOIN sentiment_analysis sa ON na.id = sa.article_id
            WHERE na.fetched_at > $1 AND sa.id IS NULL
            ORDER BY na.fetched_at DESC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }

    /// Gets recent articles for a symbol by publish time.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_recent(&self, symbol: &str, limit: i64) -> Result<Vec<NewsArticle>> {
        let pool = self.db.pool().await?;
        let records = sqlx::query_as::<_, NewsArticle>(
            r#"
            SELECT id, symbol, title, description, content,
                   source, url, published_at, fetched_at
            FROM news_articles
            WHERE symbol = $1
            ORDER BY published_at DESC NULLS LAST, fetched_at DESC
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
