use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A headline as shown in the news section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    /// Publication timestamp as reported by the source (RFC 3339 or `YYYY-MM-DD`)
    pub published_at: String,
    pub url: Option<String>,
    pub source_name: Option<String>,
}

/// One row of the historical headline archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalHeadline {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
}

impl HistoricalHeadline {
    pub fn to_article(&self) -> NewsArticle {
        NewsArticle {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            published_at: self.date.format("%Y-%m-%d").to_string(),
            url: None,
            source_name: Some("Historical archive".to_string()),
        }
    }
}

/// Where a symbol's headlines came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsSource {
    Remote,
    Historical,
    None,
}

/// Severity of a message surfaced next to the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Headlines for one symbol on the selected date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolNews {
    pub symbol: String,
    pub date: NaiveDate,
    pub source: NewsSource,
    pub articles: Vec<NewsArticle>,
    pub notices: Vec<Notice>,
}
