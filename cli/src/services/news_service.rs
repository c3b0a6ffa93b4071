use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::historical_news::HistoricalNews;
use super::market_data::{http_client, REQUEST_TIMEOUT};
use crate::{
    models::{NewsArticle, NewsSource, Notice, SymbolNews},
    utils::{format_date, next_day, Logger},
};

pub const NEWS_API_BASE_URL: &str = "https://newsapi.org";

/// How far back the remote search reaches, in days
pub const NEWS_SEARCH_WINDOW_DAYS: i64 = 30;

pub const NEWS_PAGE_SIZE: u32 = 5;

pub const CLIENT_MISSING_WARNING: &str =
    "NewsAPI client is not initialized. Cannot fetch news headlines.";

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News service returned HTTP {0}")]
    Status(u16),

    #[error("News service error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Failed to decode news response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Parameters for a headline search on one symbol and day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsQuery {
    pub q: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub language: String,
    pub sort_by: String,
    pub page_size: u32,
}

impl NewsQuery {
    /// English headlines for `symbol` between `date` and the following day, by relevancy
    pub fn for_symbol(symbol: &str, date: NaiveDate) -> Self {
        Self {
            q: symbol.to_string(),
            from: date,
            to: next_day(date),
            language: "en".to_string(),
            sort_by: "relevancy".to_string(),
            page_size: NEWS_PAGE_SIZE,
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.q.clone()),
            ("from", format_date(self.from)),
            ("to", format_date(self.to)),
            ("language", self.language.clone()),
            ("sortBy", self.sort_by.clone()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, NewsError>;
}

// --- NewsAPI response schema ---

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

/// Client for the NewsAPI `everything` endpoint
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    logger: Logger,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, NewsError> {
        let client = http_client(REQUEST_TIMEOUT)?;
        Ok(Self::with_client(client, NEWS_API_BASE_URL, api_key))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            logger: Logger::new("NEWS_API"),
        }
    }

    /// A client only when a non-blank key is configured
    pub fn from_key(client: Client, base_url: &str, api_key: Option<&str>) -> Option<Self> {
        api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| Self::with_client(client, base_url, k))
    }

    pub fn everything_url(&self) -> String {
        format!("{}/v2/everything", self.base_url)
    }

    pub fn parse_everything(body: &str) -> Result<Vec<NewsArticle>, NewsError> {
        let response: EverythingResponse = serde_json::from_str(body)?;
        if response.status != "ok" {
            return Err(NewsError::Api {
                code: response.code.unwrap_or_else(|| response.status.clone()),
                message: response.message.unwrap_or_default(),
            });
        }

        Ok(response
            .articles
            .into_iter()
            .filter_map(|raw| {
                let title = raw.title.filter(|t| !t.trim().is_empty())?;
                Some(NewsArticle {
                    title,
                    description: raw.description,
                    published_at: raw.published_at.unwrap_or_default(),
                    url: raw.url,
                    source_name: raw.source.and_then(|s| s.name),
                })
            })
            .collect())
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn search(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, NewsError> {
        self.logger.debug(&format!("Searching headlines for {} on {}", query.q, query.from));

        let response = self
            .client
            .get(self.everything_url())
            .header("X-Api-Key", &self.api_key)
            .query(&query.query_pairs())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        // Error bodies carry a code and message; prefer them over the bare status
        match Self::parse_everything(&body) {
            Err(NewsError::Serialization(_)) if !(200..300).contains(&status) => Err(NewsError::Status(status)),
            other => other,
        }
    }
}

/// Chooses between the remote headline search and the historical archive
#[derive(Clone)]
pub struct NewsDesk {
    client: Option<Arc<dyn NewsProvider>>,
    archive: Arc<HistoricalNews>,
    archive_symbol: String,
    window_days: i64,
    logger: Logger,
}

impl NewsDesk {
    pub fn new(
        client: Option<Arc<dyn NewsProvider>>,
        archive: Arc<HistoricalNews>,
        archive_symbol: impl Into<String>,
    ) -> Self {
        Self {
            client,
            archive,
            archive_symbol: archive_symbol.into().to_ascii_uppercase(),
            window_days: NEWS_SEARCH_WINDOW_DAYS,
            logger: Logger::new("NEWS"),
        }
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days.max(0);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.client.is_some()
    }

    pub fn archive(&self) -> &HistoricalNews {
        &self.archive
    }

    /// Inclusive date bounds of the remote search
    pub fn search_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - ChronoDuration::days(self.window_days), today)
    }

    /// Headlines for `symbol` on `date`.
    ///
    /// Remote results win when the date is inside the search window. Otherwise
    /// the archive answers for its symbol, using the nearest archived date when
    /// there is no exact match. Failures become notices and never errors.
    pub async fn headlines(&self, symbol: &str, date: NaiveDate, today: NaiveDate) -> SymbolNews {
        let symbol = symbol.trim().to_ascii_uppercase();
        let mut notices = Vec::new();

        let (window_start, window_end) = self.search_window(today);
        if (window_start..=window_end).contains(&date) {
            match &self.client {
                None => notices.push(Notice::warning(CLIENT_MISSING_WARNING)),
                Some(client) => match client.search(&NewsQuery::for_symbol(&symbol, date)).await {
                    Ok(articles) if !articles.is_empty() => {
                        self.logger.info(&format!("{} headlines for {} on {}", articles.len(), symbol, date));
                        return SymbolNews {
                            symbol,
                            date,
                            source: NewsSource::Remote,
                            articles,
                            notices,
                        };
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.logger.warn_with_error(&format!("News search failed for {}", symbol), &e);
                        notices.push(Notice::error(format!(
                            "An error occurred while fetching news headlines for {}: {}",
                            symbol, e
                        )));
                    }
                },
            }
        }

        if symbol == self.archive_symbol {
            if let Some(headline) = self.archive.lookup(date) {
                if headline.date != date {
                    notices.push(Notice::info(format!(
                        "No archived headline for {}; showing the nearest date, {}.",
                        format_date(date),
                        format_date(headline.date)
                    )));
                }
                return SymbolNews {
                    symbol,
                    date,
                    source: NewsSource::Historical,
                    articles: vec![headline.to_article()],
                    notices,
                };
            }
        }

        notices.push(Notice::info(format!(
            "No news headlines available for {} on the selected date.",
            symbol
        )));
        SymbolNews {
            symbol,
            date,
            source: NewsSource::None,
            articles: Vec::new(),
            notices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoricalHeadline, NoticeLevel};
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    enum Reply {
        Articles(usize),
        Fail,
    }

    struct StubNews {
        reply: Reply,
        queries: Mutex<Vec<NewsQuery>>,
    }

    impl StubNews {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NewsProvider for StubNews {
        async fn search(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>, NewsError> {
            self.queries.lock().unwrap().push(query.clone());
            match self.reply {
                Reply::Articles(n) => Ok((0..n)
                    .map(|i| NewsArticle {
                        title: format!("Headline {}", i),
                        description: None,
                        published_at: "2024-03-01T12:00:00Z".to_string(),
                        url: None,
                        source_name: Some("Wire".to_string()),
                    })
                    .collect()),
                Reply::Fail => Err(NewsError::Status(500)),
            }
        }
    }

    fn archive() -> Arc<HistoricalNews> {
        Arc::new(HistoricalNews::from_headlines(vec![
            HistoricalHeadline {
                date: date(2010, 1, 27),
                title: "iPad announced".to_string(),
                description: "Tablet unveiled".to_string(),
            },
            HistoricalHeadline {
                date: date(2010, 6, 7),
                title: "iPhone 4 announced".to_string(),
                description: "WWDC keynote".to_string(),
            },
        ]))
    }

    fn desk(client: Option<Arc<dyn NewsProvider>>) -> NewsDesk {
        NewsDesk::new(client, archive(), "AAPL")
    }

    #[test]
    fn test_query_for_symbol() {
        let query = NewsQuery::for_symbol("MSFT", date(2024, 2, 29));
        assert_eq!(query.to, date(2024, 3, 1));
        assert_eq!(query.page_size, 5);
        let pairs = query.query_pairs();
        assert!(pairs.contains(&("sortBy", "relevancy".to_string())));
        assert!(pairs.contains(&("from", "2024-02-29".to_string())));
    }

    #[test]
    fn test_parse_everything() {
        let body = r#"{"status":"ok","totalResults":2,"articles":[
            {"source":{"id":null,"name":"Reuters"},"title":"Apple rallies","description":"Shares up","url":"https://example.com/a","publishedAt":"2024-03-01T10:00:00Z"},
            {"source":{"id":null,"name":"Blog"},"title":null,"description":"dropped","url":null,"publishedAt":null}
        ]}"#;
        let articles = NewsApiClient::parse_everything(body).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source_name.as_deref(), Some("Reuters"));
        assert_eq!(articles[0].published_at, "2024-03-01T10:00:00Z");
    }

    #[test]
    fn test_parse_everything_error() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        match NewsApiClient::parse_everything(body) {
            Err(NewsError::Api { code, .. }) => assert_eq!(code, "apiKeyInvalid"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_from_key_requires_non_blank_key() {
        assert!(NewsApiClient::from_key(Client::new(), NEWS_API_BASE_URL, None).is_none());
        assert!(NewsApiClient::from_key(Client::new(), NEWS_API_BASE_URL, Some("  ")).is_none());
        assert!(NewsApiClient::from_key(Client::new(), NEWS_API_BASE_URL, Some("k")).is_some());
    }

    #[tokio::test]
    async fn test_shared_client_times_out_on_silent_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept the connection and never answer
            let _held = listener.accept().await;
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        });

        let client = http_client(std::time::Duration::from_millis(200)).unwrap();
        let news = NewsApiClient::from_key(client, &base_url, Some("key")).unwrap();
        let query = NewsQuery::for_symbol("AAPL", date(2024, 3, 1));

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), news.search(&query)).await;
        match outcome {
            Ok(Err(NewsError::Http(e))) => assert!(e.is_timeout()),
            Ok(other) => panic!("expected a timeout error, got {:?}", other.map(|a| a.len())),
            Err(_) => panic!("request was still pending after 5s"),
        }
    }

    #[tokio::test]
    async fn test_remote_results_inside_window() {
        let stub = StubNews::new(Reply::Articles(3));
        let today = date(2024, 3, 10);
        let news = desk(Some(stub.clone())).headlines("msft", date(2024, 3, 1), today).await;

        assert_eq!(news.source, NewsSource::Remote);
        assert_eq!(news.symbol, "MSFT");
        assert_eq!(news.articles.len(), 3);
        assert!(news.notices.is_empty());
        assert_eq!(stub.queries.lock().unwrap()[0].q, "MSFT");
    }

    #[tokio::test]
    async fn test_outside_window_skips_remote_and_uses_archive() {
        let stub = StubNews::new(Reply::Articles(3));
        let today = date(2024, 3, 10);
        let news = desk(Some(stub.clone())).headlines("AAPL", date(2010, 1, 27), today).await;

        assert!(stub.queries.lock().unwrap().is_empty());
        assert_eq!(news.source, NewsSource::Historical);
        assert_eq!(news.articles[0].title, "iPad announced");
        assert!(news.notices.is_empty());
    }

    #[tokio::test]
    async fn test_archive_nearest_date_adds_note() {
        let today = date(2024, 3, 10);
        let news = desk(None).headlines("AAPL", date(2010, 5, 1), today).await;
        assert_eq!(news.source, NewsSource::Historical);
        assert_eq!(news.articles[0].title, "iPhone 4 announced");
        assert_eq!(news.notices.len(), 1);
        assert!(news.notices[0].message.contains("2010-06-07"));
    }

    #[tokio::test]
    async fn test_missing_client_warns_inside_window() {
        let today = date(2024, 3, 10);
        let news = desk(None).headlines("MSFT", date(2024, 3, 9), today).await;
        assert_eq!(news.source, NewsSource::None);
        assert_eq!(news.notices[0].level, NoticeLevel::Warning);
        assert_eq!(news.notices[0].message, CLIENT_MISSING_WARNING);
        assert_eq!(
            news.notices[1].message,
            "No news headlines available for MSFT on the selected date."
        );
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_archive() {
        let stub = StubNews::new(Reply::Fail);
        let today = date(2024, 3, 10);
        let news = desk(Some(stub)).headlines("AAPL", date(2024, 3, 10), today).await;
        assert_eq!(news.source, NewsSource::Historical);
        assert_eq!(news.notices[0].level, NoticeLevel::Error);
        // nearest archived entry to 2024 is the latest one
        assert_eq!(news.articles[0].title, "iPhone 4 announced");
    }

    #[tokio::test]
    async fn test_empty_remote_for_other_symbol() {
        let stub = StubNews::new(Reply::Articles(0));
        let today = date(2024, 3, 10);
        let news = desk(Some(stub)).headlines("TSLA", date(2024, 2, 9), today).await;
        assert_eq!(news.source, NewsSource::None);
        assert_eq!(news.notices.len(), 1);
        assert_eq!(news.notices[0].level, NoticeLevel::Info);
    }

    #[test]
    fn test_search_window_bounds() {
        let (start, end) = desk(None).search_window(date(2024, 3, 10));
        assert_eq!(start, date(2024, 2, 9));
        assert_eq!(end, date(2024, 3, 10));
    }
}
