use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use stockdash::{
    api::Dashboard,
    services::{
        HistoricalNews, MemoizedProvider, NewsApiClient, NewsDesk, NewsProvider, YahooFinanceClient, http_client,
    },
};
use stockdash_server::{AppState, NewsRateLimit, build_router, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::AppConfig::load()?;

    // Initialize tracing with instance_name in all logs
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Set a global span with instance_name for all subsequent logs
    let _span = tracing::info_span!("instance", name = %app_config.instance_name).entered();

    tracing::info!("Starting stockdash-server");
    tracing::info!(?app_config.environment, port = app_config.port, "Loaded configuration");
    for notice in app_config.startup_notices() {
        tracing::warn!("{}", notice);
    }

    let http = http_client(app_config.request_timeout).context("Failed to build HTTP client")?;

    let market = YahooFinanceClient::with_client(http.clone(), app_config.market_data_base_url.clone())
        .with_random_agent(true)
        .with_api_key(app_config.market_data_api_key.clone());

    let news_client: Option<Arc<dyn NewsProvider>> = NewsApiClient::from_key(
        http,
        &app_config.news_api_base_url,
        app_config.news_api_key.as_deref(),
    )
    .map(|client| Arc::new(client) as Arc<dyn NewsProvider>);

    let archive = Arc::new(HistoricalNews::load_or_empty(&app_config.historical_news_path));
    tracing::info!(headlines = archive.len(), symbol = %app_config.historical_news_symbol, "Historical news ready");

    let news = NewsDesk::new(news_client, archive, app_config.historical_news_symbol.clone());
    let dashboard = Dashboard::new(Arc::new(MemoizedProvider::new(market)), news);

    let news_limit = NewsRateLimit::from_config(&app_config);
    let port = app_config.port;
    let app_state = AppState {
        dashboard,
        config: Arc::new(app_config),
    };
    let app = build_router(app_state, Some(news_limit))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
