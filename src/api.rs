use crate::SharedConfig;
use axum::{
    extract::{Json, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::json;
use stockdash::{
    api::{Dashboard, DashboardReport, DashboardRequest, DashboardRequestBuilder, normalize_symbol, split_list},
    error::DashboardError,
    models::{DEFAULT_SYMBOL, DateRangeConfig, SearchResult, SymbolNews, TimeRange},
    services::{export_file_name, news_to_csv, prices_to_csv, search_stocks},
    utils::{parse_date, parse_indicator_list},
};
use tracing::{debug, info, instrument, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Error body `{ "error": ... }`; 400 for bad input, 502 when a provider failed
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl From<DashboardError> for ApiError {
    fn from(error: DashboardError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_user_error() => StatusCode::BAD_REQUEST,
            DashboardError::MarketData(_) | DashboardError::News(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::BAD_REQUEST {
            debug!(error = %self.0, "Rejected request");
        } else {
            warn!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub symbol: Option<String>,
    #[serde(default)]
    pub compare: Vec<String>,
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceExportParams {
    pub symbol: Option<String>,
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>, DashboardError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .transpose()
}

fn parse_range(value: Option<&str>) -> Result<TimeRange, DashboardError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(range) => range.parse(),
        None => Ok(TimeRange::YearToDate),
    }
}

fn date_range_from(
    range: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRangeConfig, DashboardError> {
    Ok(match parse_range(range)? {
        TimeRange::Custom => DateRangeConfig::custom(parse_optional_date(start)?, parse_optional_date(end)?),
        range => DateRangeConfig::new(range),
    })
}

pub fn dashboard_request(params: &DashboardParams) -> Result<DashboardRequest, DashboardError> {
    let date_range = date_range_from(params.range.as_deref(), params.start.as_deref(), params.end.as_deref())?;

    let mut builder = DashboardRequestBuilder::new()
        .with_symbol(params.symbol.clone().unwrap_or_else(|| DEFAULT_SYMBOL.to_string()))
        .with_comparisons(split_list(&params.compare))
        .with_range(date_range.range)
        .with_custom_dates(date_range.start_date, date_range.end_date);

    // An explicit empty list means no indicators
    if !params.indicators.is_empty() {
        builder = builder.with_indicators(parse_indicator_list(&params.indicators.join(","))?);
    }

    builder.build()
}

fn news_symbols(params: &NewsParams) -> Result<Vec<String>, DashboardError> {
    let symbols = split_list(&params.symbols);
    if symbols.is_empty() {
        return Ok(vec![DEFAULT_SYMBOL.to_string()]);
    }
    let mut normalized: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        let symbol = normalize_symbol(symbol)?;
        if !normalized.contains(&symbol) {
            normalized.push(symbol);
        }
    }
    Ok(normalized)
}

fn csv_response(file_name: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        body,
    )
        .into_response()
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[instrument(skip(dashboard, config))]
pub async fn dashboard_handler(
    State(dashboard): State<Dashboard>,
    State(config): State<SharedConfig>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardReport>, ApiError> {
    debug!("Received dashboard request");
    let request = dashboard_request(&params)?;
    let report = dashboard.build(&request, config.today_in_market()).await?;
    info!(
        symbols = ?request.symbols(),
        range = %request.date_range.range,
        warnings = report.warnings.len(),
        "Returning dashboard"
    );
    Ok(Json(report))
}

#[instrument(skip(dashboard, config))]
pub async fn news_handler(
    State(dashboard): State<Dashboard>,
    State(config): State<SharedConfig>,
    Query(params): Query<NewsParams>,
) -> Result<Json<Vec<SymbolNews>>, ApiError> {
    let symbols = news_symbols(&params)?;
    let today = config.today_in_market();
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or(today);

    let news = dashboard.news(&symbols, date, today).await;
    info!(symbol_count = news.len(), %date, "Returning news");
    Ok(Json(news))
}

#[instrument(skip(dashboard))]
pub async fn search_handler(
    State(dashboard): State<Dashboard>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<SearchResult>> {
    Json(search_stocks(dashboard.market().as_ref(), &params.q).await)
}

pub async fn ranges_handler() -> Json<Vec<&'static str>> {
    Json(TimeRange::ALL.iter().map(|r| r.as_str()).collect())
}

#[instrument(skip(dashboard, config))]
pub async fn export_prices_handler(
    State(dashboard): State<Dashboard>,
    State(config): State<SharedConfig>,
    Query(params): Query<PriceExportParams>,
) -> Result<Response, ApiError> {
    let symbol = normalize_symbol(params.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL))?;
    let date_range = date_range_from(params.range.as_deref(), params.start.as_deref(), params.end.as_deref())?;

    let series = dashboard
        .price_table(&symbol, &date_range, config.today_in_market())
        .await?;
    info!(%symbol, rows = series.len(), "Exporting prices");
    Ok(csv_response(&export_file_name(&symbol, "prices"), prices_to_csv(&series)?))
}

#[instrument(skip(dashboard, config))]
pub async fn export_news_handler(
    State(dashboard): State<Dashboard>,
    State(config): State<SharedConfig>,
    Query(params): Query<NewsParams>,
) -> Result<Response, ApiError> {
    let symbols = news_symbols(&params)?;
    let today = config.today_in_market();
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or(today);

    let news = dashboard.news(&symbols, date, today).await;
    let file_name = export_file_name(&symbols.join("_"), "news");
    Ok(csv_response(&file_name, news_to_csv(&news)?))
}

#[instrument(skip(dashboard, config))]
pub async fn health_handler(
    State(dashboard): State<Dashboard>,
    State(config): State<SharedConfig>,
) -> impl IntoResponse {
    let desk = dashboard.news_desk();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "instance": config.instance_name,
            "environment": config.environment,
            "news_client": desk.has_remote(),
            "historical_headlines": desk.archive().len(),
            "notices": config.startup_notices(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockdash::utils::Indicator;

    #[test]
    fn test_dashboard_request_defaults() {
        let request = dashboard_request(&DashboardParams::default()).unwrap();
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.date_range.range, TimeRange::YearToDate);
        assert_eq!(request.indicators, vec![Indicator::Sma]);
    }

    #[test]
    fn test_dashboard_request_lists_and_custom_dates() {
        let params = DashboardParams {
            symbol: Some("tsla".to_string()),
            compare: vec!["MSFT,GOOGL".to_string(), "AMZN".to_string()],
            range: Some("custom".to_string()),
            start: Some("2023-01-01".to_string()),
            end: Some("".to_string()),
            indicators: vec!["ema".to_string(), "RSI".to_string()],
        };
        let request = dashboard_request(&params).unwrap();
        assert_eq!(request.symbols(), vec!["TSLA", "MSFT", "GOOGL", "AMZN"]);
        assert_eq!(request.date_range.range, TimeRange::Custom);
        assert!(request.date_range.start_date.is_some());
        assert!(request.date_range.end_date.is_none());
        assert_eq!(request.indicators, vec![Indicator::Ema, Indicator::Rsi]);
    }

    #[test]
    fn test_bad_input_maps_to_bad_request() {
        let params = DashboardParams {
            range: Some("fortnight".to_string()),
            ..Default::default()
        };
        let error = ApiError::from(dashboard_request(&params).unwrap_err());
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error = ApiError(DashboardError::MarketData(stockdash::services::MarketDataError::NoData));
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_news_symbols_default_and_dedup() {
        assert_eq!(news_symbols(&NewsParams::default()).unwrap(), vec!["AAPL"]);
        let params = NewsParams {
            symbols: vec!["aapl,msft".to_string(), "AAPL".to_string()],
            date: None,
        };
        assert_eq!(news_symbols(&params).unwrap(), vec!["AAPL", "MSFT"]);
    }
}
