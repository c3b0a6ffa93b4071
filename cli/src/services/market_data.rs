use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    models::{HistoryWindow, PricePoint, SearchResult, TickerInfo},
    utils::{date_from_timestamp, next_day, timestamp_of, Logger, Timer},
};

pub const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Per-request timeout for provider calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One HTTP client for the market data and news providers
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode provider response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider returned HTTP {0}")]
    Status(u16),

    #[error("Provider error {code}: {description}")]
    Api { code: String, description: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("No data returned")]
    NoData,
}

/// Source of daily price history and symbol metadata
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily rows inside `window`, ascending by date
    async fn history(
        &self,
        symbol: &str,
        window: HistoryWindow,
    ) -> Result<Vec<PricePoint>, MarketDataError>;

    /// Long name, exchange and market capitalization
    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError>;
}

// --- Yahoo Finance response schema ---

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<QuoteSummaryModules>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryModules {
    price: Option<PriceModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    symbol: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    exchange_name: Option<String>,
    market_cap: Option<RawNumber>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNumber {
    raw: Option<f64>,
}

/// Yahoo Finance chart and quote-summary client
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    user_agents: Vec<String>,
    random_agent: bool,
    logger: Logger,
}

impl YahooFinanceClient {
    pub fn new(random_agent: bool) -> Result<Self, MarketDataError> {
        let client = http_client(REQUEST_TIMEOUT)?;
        Ok(Self::with_client(client, YAHOO_BASE_URL).with_random_agent(random_agent))
    }

    /// Reuse an existing HTTP client against `base_url` (no trailing slash)
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            user_agents,
            random_agent: false,
            logger: Logger::new("MARKET_DATA"),
        }
    }

    pub fn with_random_agent(mut self, random_agent: bool) -> Self {
        self.random_agent = random_agent;
        self
    }

    /// Sent as `X-API-KEY` for keyed gateways in front of the provider
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    fn user_agent(&self) -> &str {
        if self.random_agent {
            if let Some(agent) = self.user_agents.choose(&mut rand::rng()) {
                return agent;
            }
        }
        &self.user_agents[0]
    }

    pub fn chart_url(&self, symbol: &str, window: HistoryWindow) -> String {
        let base = format!("{}/v8/finance/chart/{}?interval=1d&includePrePost=false", self.base_url, symbol);
        if window.is_full() {
            return format!("{}&range=max", base);
        }
        let period1 = window.start.map(timestamp_of).unwrap_or(0);
        let period2 = window
            .end
            .map(|end| timestamp_of(next_day(end)))
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        format!("{}&period1={}&period2={}", base, period1, period2)
    }

    pub fn quote_summary_url(&self, symbol: &str) -> String {
        format!("{}/v10/finance/quoteSummary/{}?modules=price", self.base_url, symbol)
    }

    async fn fetch_body(&self, url: &str) -> Result<(u16, String), MarketDataError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json, text/plain, */*")
            .header("User-Agent", self.user_agent());
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Decode a chart response into ascending daily rows, dropping rows without a close
    pub fn parse_chart(body: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let response: ChartResponse = serde_json::from_str(body)?;

        if let Some(err) = response.chart.error {
            return Err(MarketDataError::Api {
                code: err.code,
                description: err.description,
            });
        }

        let data = response
            .chart
            .result
            .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
            .ok_or(MarketDataError::NoData)?;

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let length = data.timestamp.len();
        if [quote.open.len(), quote.high.len(), quote.low.len(), quote.close.len(), quote.volume.len()]
            .iter()
            .any(|&len| len != length)
        {
            return Err(MarketDataError::InvalidResponse("Inconsistent array lengths".to_string()));
        }

        let mut points = Vec::with_capacity(length);
        for i in 0..length {
            let Some(close) = quote.close[i] else {
                continue;
            };
            let date = date_from_timestamp(data.timestamp[i]).ok_or_else(|| {
                MarketDataError::InvalidResponse(format!("Invalid timestamp {} at index {}", data.timestamp[i], i))
            })?;
            points.push(PricePoint {
                date,
                open: quote.open[i].unwrap_or(close),
                high: quote.high[i].unwrap_or(close),
                low: quote.low[i].unwrap_or(close),
                close,
                volume: quote.volume[i].unwrap_or(0),
            });
        }

        points.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(points)
    }

    /// Decode the `price` module of a quote-summary response
    pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<TickerInfo, MarketDataError> {
        let response: QuoteSummaryResponse = serde_json::from_str(body)?;

        if let Some(err) = response.quote_summary.error {
            return Err(MarketDataError::Api {
                code: err.code,
                description: err.description,
            });
        }

        let price = response
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|modules| modules.price)
            .ok_or(MarketDataError::NoData)?;

        Ok(TickerInfo {
            symbol: price.symbol.unwrap_or_else(|| symbol.to_string()),
            long_name: price.long_name.or(price.short_name),
            exchange: price.exchange_name,
            market_cap: price.market_cap.and_then(|cap| cap.raw),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn history(
        &self,
        symbol: &str,
        window: HistoryWindow,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let url = self.chart_url(symbol, window);
        self.logger.debug(&format!("Fetching history for {} ({:?})", symbol, window));

        let timer = Timer::start(&format!("{} history fetch", symbol));
        let (status, body) = self.fetch_body(&url).await?;

        // Yahoo reports unknown symbols as 404 with a chart.error body
        let parsed = Self::parse_chart(&body);
        let points = match parsed {
            Ok(points) => points,
            Err(MarketDataError::Serialization(_)) if !(200..300).contains(&status) => {
                return Err(MarketDataError::Status(status));
            }
            Err(e) => return Err(e),
        };

        let points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| window.start.map_or(true, |s| p.date >= s))
            .filter(|p| window.end.map_or(true, |e| p.date <= e))
            .collect();

        timer.log_elapsed("MARKET_DATA");
        self.logger.info(&format!("Fetched {} rows for {}", points.len(), symbol));

        if points.is_empty() {
            return Err(MarketDataError::NoData);
        }
        Ok(points)
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
        let url = self.quote_summary_url(symbol);
        let (status, body) = self.fetch_body(&url).await?;

        match Self::parse_quote_summary(symbol, &body) {
            Err(MarketDataError::Serialization(_)) if !(200..300).contains(&status) => {
                Err(MarketDataError::Status(status))
            }
            other => other,
        }
    }
}

/// Look a symbol up by exact ticker; any failure yields an empty list
pub async fn search_stocks(provider: &dyn MarketDataProvider, query: &str) -> Vec<SearchResult> {
    let symbol = query.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Vec::new();
    }

    match provider.ticker_info(&symbol).await {
        Ok(info) => vec![SearchResult::from(info)],
        Err(e) => {
            Logger::new("SEARCH").warn(&format!("Error searching for {}: {}", symbol, e));
            Vec::new()
        }
    }
}
