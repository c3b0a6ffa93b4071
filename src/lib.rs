pub mod api;
pub mod config;

use crate::config::AppConfig;
use anyhow::Context;
use axum::{Router, extract::FromRef, routing::get};
use std::sync::Arc;
use stockdash::api::Dashboard;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::CorsLayer;

pub type SharedConfig = Arc<AppConfig>;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub config: SharedConfig,
}

impl FromRef<AppState> for Dashboard {
    fn from_ref(app_state: &AppState) -> Dashboard {
        app_state.dashboard.clone()
    }
}

impl FromRef<AppState> for SharedConfig {
    fn from_ref(app_state: &AppState) -> SharedConfig {
        app_state.config.clone()
    }
}

/// Per-client limit on the news routes, which spend remote search quota
#[derive(Debug, Clone, Copy)]
pub struct NewsRateLimit {
    pub per_second: u64,
    pub burst: u32,
}

impl NewsRateLimit {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            per_second: config.news_rate_per_second,
            burst: config.news_burst,
        }
    }
}

/// All routes. The rate limit keys on the peer address, so a limited router
/// must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState, news_limit: Option<NewsRateLimit>) -> anyhow::Result<Router> {
    let mut news_routes = Router::new()
        .route("/api/news", get(api::news_handler))
        .route("/api/export/news.csv", get(api::export_news_handler));

    if let Some(limit) = news_limit {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(limit.per_second)
                .burst_size(limit.burst)
                .finish()
                .context("Invalid news rate limit")?,
        );
        news_routes = news_routes.layer(GovernorLayer::new(governor_conf));
    }

    Ok(Router::new()
        .route("/", get(api::index_handler))
        .route("/health", get(api::health_handler))
        .route("/api/dashboard", get(api::dashboard_handler))
        .route("/api/search", get(api::search_handler))
        .route("/api/ranges", get(api::ranges_handler))
        .route("/api/export/prices.csv", get(api::export_prices_handler))
        .merge(news_routes)
        .layer(CorsLayer::permissive())
        .with_state(state))
}
