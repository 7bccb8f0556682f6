//! News article data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored news article. `url` is unique across the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsArticle {
    pub id: i64,
    pub symbol: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    /// Publisher name, e.g. "Reuters"
    pub source: Option<String>,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
}

impl NewsArticle {
    /// Text handed to the sentiment classifier: title plus description.
    #[must_use]
    pub fn analysis_text(&self) -> String {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() => {
                format!("{} {}", self.title, description)
            }
            _ => self.title.clone(),
        }
    }
}

/// An article that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub symbol: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub source: Option<String>,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    pub fn new(symbol: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            title: title.into(),
            description: None,
            content: None,
            source: None,
            url: url.into(),
            published_at: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_analysis_text_joins_title_and_description() {
        let mut article = NewsArticle {
            id: 1,
            symbol: "AAPL".to_string(),
            title: "Apple beats estimates".to_string(),
            description: Some("Revenue growth in services".to_string()),
            content: None,
            source: None,
            url: "https://example.com/a".to_string(),
            published_at: None,
            fetched_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        };
        assert_eq!(
            article.analysis_text(),
            "Apple beats estimates Revenue growth in services"
        );

        article.description = None;
        assert_eq!(article.analysis_text(), "Apple beats estimates");
    }
}
