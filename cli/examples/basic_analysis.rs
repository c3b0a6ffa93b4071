//! Basic Dashboard Example
//!
//! Fetches live history for a symbol and one comparison, then prints the
//! metrics and any warnings. Requires network access.

use std::error::Error;
use std::sync::Arc;
use stockdash::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    stockdash::init_logger()?;

    println!("🚀 Basic Dashboard Example");
    println!("{}", "=".repeat(50));

    let market = Arc::new(MemoizedProvider::new(YahooFinanceClient::new(true)?));
    let news = NewsDesk::new(None, Arc::new(HistoricalNews::empty()), "AAPL");
    let dashboard = Dashboard::new(market, news);

    let request = DashboardRequestBuilder::new()
        .with_symbol("AAPL")
        .add_comparison("MSFT")
        .with_range(TimeRange::YearToDate)
        .with_indicators(vec![Indicator::Sma, Indicator::Ema])
        .build()?;

    let report = dashboard.build(&request, today_in(MARKET_TIMEZONE)).await?;

    println!("📊 {}", report.chart.layout.title);
    for metrics in &report.metrics {
        println!(
            "   {}: {} ({}), {} {}",
            metrics.symbol,
            metrics.display.current_price,
            metrics.display.performance,
            metrics.display.return_label,
            metrics.display.return_value
        );
    }
    for warning in &report.warnings {
        println!("⚠️  {}", warning.message);
    }

    Ok(())
}
