use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, NaiveDate};
use http_body_util::BodyExt;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use stockdash::{
    api::Dashboard,
    models::{HistoricalHeadline, HistoryWindow, PricePoint, TickerInfo},
    services::{HistoricalNews, MarketDataError, MarketDataProvider, NewsDesk},
};
use stockdash_server::{AppState, NewsRateLimit, build_router, config::AppConfig};
use tower::ServiceExt;

struct StubMarket;

#[async_trait]
impl MarketDataProvider for StubMarket {
    async fn history(&self, symbol: &str, _window: HistoryWindow) -> Result<Vec<PricePoint>, MarketDataError> {
        match symbol {
            "AAPL" => {
                let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
                Ok((0..40)
                    .map(|i| {
                        let close = 50.0 + i as f64;
                        PricePoint::new(start + Duration::days(i), close, close, close, close, 100)
                    })
                    .collect())
            }
            _ => Err(MarketDataError::Status(500)),
        }
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
        match symbol {
            "AAPL" => Ok(TickerInfo {
                symbol: "AAPL".to_string(),
                long_name: Some("Apple Inc.".to_string()),
                exchange: Some("NMS".to_string()),
                market_cap: Some(1.5e12),
            }),
            _ => Err(MarketDataError::NoData),
        }
    }
}

fn state() -> AppState {
    let archive = HistoricalNews::from_headlines(vec![HistoricalHeadline {
        date: NaiveDate::from_ymd_opt(2010, 1, 27).unwrap(),
        title: "iPad announced".to_string(),
        description: "Tablet unveiled".to_string(),
    }]);
    let news = NewsDesk::new(None, Arc::new(archive), "AAPL");
    AppState {
        dashboard: Dashboard::new(Arc::new(StubMarket), news),
        config: Arc::new(AppConfig::from_yaml_str("instance_name: test-node\n").unwrap()),
    }
}

fn app() -> Router {
    build_router(state(), None).unwrap()
}

async fn status_from(app: &Router, uri: &str, peer: [u8; 4]) -> StatusCode {
    let request = Request::builder()
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::from((peer, 40_000))))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, content_type, body)
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn ranges_lists_labels_in_order() {
    let (status, body) = get_json("/api/ranges").await;
    assert_eq!(status, StatusCode::OK);
    let labels = body.as_array().unwrap();
    assert_eq!(labels.len(), 12);
    assert_eq!(labels[0], "1 Day");
    assert_eq!(labels[4], "YTD");
    assert_eq!(labels[11], "Custom");
}

#[tokio::test]
async fn dashboard_builds_chart_and_reports_failed_symbols() {
    let (status, body) =
        get_json("/api/dashboard?symbol=aapl&range=Maximum&compare=MSFT&indicators=SMA&indicators=RSI").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["chart"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["AAPL Close Price", "AAPL 20-day SMA", "AAPL 14-day RSI"]);
    assert_eq!(body["chart"]["layout"]["yaxis2"]["range"][1], 100.0);

    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["message"], "Error fetching data for MSFT: Provider returned HTTP 500");

    let metrics = &body["metrics"][0];
    assert_eq!(metrics["display"]["current_price"], "$89.00");
    assert_eq!(metrics["display"]["market_cap"], "1.50T");
    assert_eq!(metrics["display"]["return_label"], "Annualized Return (Maximum)");
}

#[tokio::test]
async fn dashboard_rejects_bad_input() {
    let (status, body) = get_json("/api/dashboard?range=fortnight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fortnight"));

    let (status, _) = get_json("/api/dashboard?compare=MSFT,GOOGL,AMZN,TSLA").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json("/api/dashboard?range=Custom&start=2024-02-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn price_export_is_csv() {
    let (status, content_type, body) = get("/api/export/prices.csv?symbol=AAPL&range=Maximum").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));

    let csv = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
    assert_eq!(lines[1], "2020-01-01,50,50,50,50,100");
    assert_eq!(lines.len(), 41);
}

#[tokio::test]
async fn price_export_upstream_failure_is_bad_gateway() {
    let (status, body) = get_json("/api/export/prices.csv?symbol=MSFT").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn news_falls_back_to_archive() {
    let (status, body) = get_json("/api/news?symbols=AAPL,MSFT&date=2010-01-29").await;
    assert_eq!(status, StatusCode::OK);

    let aapl = &body[0];
    assert_eq!(aapl["source"], "historical");
    assert_eq!(aapl["articles"][0]["title"], "iPad announced");
    assert!(aapl["notices"][0]["message"].as_str().unwrap().contains("2010-01-27"));

    let msft = &body[1];
    assert_eq!(msft["source"], "none");
    assert_eq!(
        msft["notices"][0]["message"],
        "No news headlines available for MSFT on the selected date."
    );
}

#[tokio::test]
async fn news_export_is_csv() {
    let (status, _, body) = get("/api/export/news.csv?symbols=AAPL&date=2010-01-27").await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(body).unwrap();
    assert!(csv.starts_with("symbol,published_at,title,description,url,source\n"));
    assert!(csv.contains("AAPL,2010-01-27,iPad announced,Tablet unveiled,,Historical archive"));
}

#[tokio::test]
async fn search_returns_match_or_empty() {
    let (status, body) = get_json("/api/search?q=aapl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Apple Inc.");

    let (_, body) = get_json("/api/search?q=ZZZZ").await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_and_index() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["instance"], "test-node");
    assert_eq!(body["news_client"], false);
    assert_eq!(body["historical_headlines"], 1);

    let (status, content_type, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("Plotly"));
    assert!(page.contains("Published on: "));
}

#[tokio::test]
async fn news_routes_are_rate_limited_per_client() {
    // One token back per minute, so nothing refills during the test
    let limit = NewsRateLimit { per_second: 60, burst: 2 };
    let app = build_router(state(), Some(limit)).unwrap();
    let news = "/api/news?symbols=AAPL&date=2010-01-27";
    let client = [10, 0, 0, 1];

    assert_eq!(status_from(&app, news, client).await, StatusCode::OK);
    assert_eq!(status_from(&app, "/api/export/news.csv?symbols=AAPL&date=2010-01-27", client).await, StatusCode::OK);
    assert_eq!(status_from(&app, news, client).await, StatusCode::TOO_MANY_REQUESTS);

    // Other routes and other clients are unaffected
    assert_eq!(status_from(&app, "/api/ranges", client).await, StatusCode::OK);
    assert_eq!(status_from(&app, news, [10, 0, 0, 2]).await, StatusCode::OK);
}
