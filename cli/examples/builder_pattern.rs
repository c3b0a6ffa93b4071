//! Builder Pattern Example
//!
//! Validates a few dashboard requests and runs the indicator and return
//! calculations on a synthetic series, without touching the network.

use chrono::{Duration, NaiveDate};
use std::error::Error;
use stockdash::api::DashboardRequestBuilder;
use stockdash::models::{PricePoint, PriceSeries, SymbolMetrics, TimeRange};
use stockdash::utils::Indicator;

fn main() -> Result<(), Box<dyn Error>> {
    stockdash::init_logger()?;

    println!("🏗️  Builder Pattern Example");
    println!("{}", "=".repeat(60));

    let request = DashboardRequestBuilder::new()
        .with_symbol("aapl")
        .with_comparisons(vec!["MSFT".to_string(), "aapl".to_string(), "GOOGL".to_string()])
        .with_range(TimeRange::OneYear)
        .with_indicators(vec![Indicator::Sma, Indicator::Rsi])
        .build()?;
    println!("✅ Symbols: {:?}, range: {}", request.symbols(), request.date_range.range);

    match DashboardRequestBuilder::new()
        .with_comparisons(vec!["MSFT".into(), "GOOGL".into(), "AMZN".into(), "TSLA".into()])
        .build()
    {
        Ok(_) => println!("❌ Expected the comparison limit to apply"),
        Err(e) => println!("✅ Rejected: {}", e),
    }

    // Two years of a slowly rising series with a weekly wobble
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).ok_or("bad date")?;
    let points: Vec<PricePoint> = (0..730)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.1 + ((i % 7) as f64 - 3.0);
            PricePoint::new(start + Duration::days(i), close, close + 1.0, close - 1.0, close, 1_000_000)
        })
        .collect();
    let full = PriceSeries::new("DEMO", points);

    let anchor = full.last_date().ok_or("empty series")?;
    let series = full.since(request.date_range.start_for(anchor));
    let closes = series.closes();

    for indicator in &request.indicators {
        let values = indicator.compute(&closes);
        let latest = values.iter().rev().flatten().next();
        println!("📈 {}: latest {:?}", indicator.trace_name("DEMO"), latest);
    }

    if let Some(metrics) = SymbolMetrics::from_series(&series, request.date_range.range.as_str(), Some(2.4e9)) {
        println!(
            "📊 {} | {} | {}: {} | market cap {}",
            metrics.display.current_price,
            metrics.display.performance,
            metrics.display.return_label,
            metrics.display.return_value,
            metrics.display.market_cap
        );
    }

    Ok(())
}
