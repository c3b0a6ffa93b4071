use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use stockdash::{
    api::{split_list, Dashboard, DashboardRequestBuilder},
    config::Credentials,
    models::{NewsArticle, TimeRange, DEFAULT_SYMBOL},
    services::{
        http_client, news_to_csv, prices_to_csv, search_stocks, HistoricalNews, MemoizedProvider,
        NewsApiClient, NewsDesk, NewsProvider, YahooFinanceClient, NEWS_API_BASE_URL, REQUEST_TIMEOUT,
        YAHOO_BASE_URL,
    },
    utils::{init_logger, parse_date, parse_indicator_list, today_in},
};

#[derive(Parser)]
#[command(name = "stockdash")]
#[command(about = "Stock price dashboard: indicators, return metrics and news headlines")]
pub struct Cli {
    /// Historical headline archive (date,title,description)
    #[arg(long, global = true, default_value = "apple_historical_news.csv")]
    pub archive: PathBuf,

    /// Symbol the archive belongs to
    #[arg(long, global = true, default_value = DEFAULT_SYMBOL)]
    pub archive_symbol: String,

    /// Timezone whose calendar date counts as today
    #[arg(long, global = true, default_value = "America/New_York")]
    pub market_timezone: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the price chart and metrics for a symbol and its comparisons
    Chart {
        /// Primary symbol
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbol: String,
        /// Comparison symbols (comma-separated, at most 3)
        #[arg(short, long)]
        compare: Vec<String>,
        /// Time range, e.g. YTD, "1 Year", 5Y, Maximum, Custom
        #[arg(short, long, default_value = "YTD")]
        range: String,
        /// Custom range start (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Custom range end (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Indicators (comma-separated SMA, EMA, RSI)
        #[arg(short, long, default_value = "SMA")]
        indicators: String,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Write the primary symbol's price table to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show headlines for symbols on a date
    News {
        /// Symbols (comma-separated)
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbols: Vec<String>,
        /// Date (YYYY-MM-DD), today when omitted
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
        /// Write the headlines to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Look a ticker up
    Search {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// List the selectable time ranges
    Ranges,
}

fn build_dashboard(cli: &Cli, credentials: &Credentials) -> anyhow::Result<Dashboard> {
    let http = http_client(REQUEST_TIMEOUT).context("Failed to build HTTP client")?;

    let market = YahooFinanceClient::with_client(http.clone(), YAHOO_BASE_URL)
        .with_random_agent(true)
        .with_api_key(credentials.market_data_api_key.clone());

    let news_client: Option<Arc<dyn NewsProvider>> = NewsApiClient::from_key(
        http,
        NEWS_API_BASE_URL,
        credentials.news_api_key.as_deref(),
    )
    .map(|client| Arc::new(client) as Arc<dyn NewsProvider>);

    let archive = Arc::new(HistoricalNews::load_or_empty(&cli.archive));
    let news = NewsDesk::new(news_client, archive, cli.archive_symbol.clone());

    Ok(Dashboard::new(Arc::new(MemoizedProvider::new(market)), news))
}

fn article_lines(article: &NewsArticle) -> Vec<String> {
    let mut lines = vec![format!("   - {}", article.title)];
    if let Some(description) = &article.description {
        lines.push(format!("     {}", description));
    }
    lines.push(format!("     Published on: {}", article.published_at));
    lines
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logger()?;

    let cli = Cli::parse();
    let credentials = Credentials::from_env();
    credentials.log_startup_notices();
    let timezone: Tz = cli
        .market_timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid market timezone {}: {}", cli.market_timezone, e))?;
    let today = today_in(timezone);

    match &cli.command {
        Commands::Chart {
            symbol,
            compare,
            range,
            start,
            end,
            indicators,
            json,
            export,
        } => {
            let dashboard = build_dashboard(&cli, &credentials)?;
            let request = DashboardRequestBuilder::new()
                .with_symbol(symbol.clone())
                .with_comparisons(split_list(compare))
                .with_range(range.parse::<TimeRange>()?)
                .with_custom_dates(
                    start.as_deref().map(parse_date).transpose()?,
                    end.as_deref().map(parse_date).transpose()?,
                )
                .with_indicators(parse_indicator_list(indicators)?)
                .build()?;

            let report = dashboard.build(&request, today).await?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.chart.layout.title);
                for metrics in &report.metrics {
                    println!(
                        "{:<8} price {:>10}  performance {:>9}  {} {:>9}  market cap {}",
                        metrics.symbol,
                        metrics.display.current_price,
                        metrics.display.performance,
                        metrics.display.return_label,
                        metrics.display.return_value,
                        metrics.display.market_cap,
                    );
                }
                for warning in &report.warnings {
                    println!("⚠️  {}", warning.message);
                }
            }

            if let Some(path) = export {
                let series = report
                    .series_for(&request.symbol)
                    .with_context(|| format!("No price data to export for {}", request.symbol))?;
                std::fs::write(path, prices_to_csv(series)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("✅ Exported {} rows to {}", series.len(), path.display());
            }
        }
        Commands::News {
            symbols,
            date,
            json,
            export,
        } => {
            let dashboard = build_dashboard(&cli, &credentials)?;
            let date = date.as_deref().map(parse_date).transpose()?.unwrap_or(today);
            let news = dashboard.news(&split_list(symbols), date, today).await;

            if *json {
                println!("{}", serde_json::to_string_pretty(&news)?);
            } else {
                for entry in &news {
                    println!("📰 {} ({})", entry.symbol, entry.date);
                    for notice in &entry.notices {
                        println!("   {}", notice.message);
                    }
                    for article in &entry.articles {
                        for line in article_lines(article) {
                            println!("{}", line);
                        }
                    }
                }
            }

            if let Some(path) = export {
                std::fs::write(path, news_to_csv(&news)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("✅ Exported headlines to {}", path.display());
            }
        }
        Commands::Search { query, json } => {
            let dashboard = build_dashboard(&cli, &credentials)?;
            let results = search_stocks(dashboard.market().as_ref(), query).await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results for {}", query);
            } else {
                for result in results {
                    println!("{}  {}  ({})", result.symbol, result.name, result.exchange);
                }
            }
        }
        Commands::Ranges => {
            for range in TimeRange::ALL {
                println!("{}", range);
            }
        }
    }

    Ok(())
}
