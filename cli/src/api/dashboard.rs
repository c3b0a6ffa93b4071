//! The dashboard pipeline: fetch, slice, compute, describe.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::builder::DashboardRequest;
use crate::error::Result;
use crate::models::{
    Annotation, ChartSpec, Dash, DateRangeConfig, Notice, PriceSeries, SymbolMetrics, SymbolNews, Trace,
};
use crate::services::{MarketDataError, MarketDataProvider, NewsDesk};
use crate::utils::{Indicator, IndicatorSeries, Logger, Timer};

/// Everything the presentation layer needs for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub chart: ChartSpec,
    pub metrics: Vec<SymbolMetrics>,
    /// Sliced price tables in display order, for the data section and export
    pub series: Vec<PriceSeries>,
    pub warnings: Vec<Notice>,
}

impl DashboardReport {
    pub fn metrics_for(&self, symbol: &str) -> Option<&SymbolMetrics> {
        self.metrics.iter().find(|m| m.symbol == symbol)
    }

    pub fn series_for(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }
}

pub fn chart_title(range_label: &str) -> String {
    format!("Stock Price Comparison ({}) with Technical Indicators", range_label)
}

#[derive(Clone)]
pub struct Dashboard {
    market: Arc<dyn MarketDataProvider>,
    news: NewsDesk,
    logger: Logger,
}

impl Dashboard {
    pub fn new(market: Arc<dyn MarketDataProvider>, news: NewsDesk) -> Self {
        Self {
            market,
            news,
            logger: Logger::new("DASHBOARD"),
        }
    }

    pub fn market(&self) -> &Arc<dyn MarketDataProvider> {
        &self.market
    }

    pub fn news_desk(&self) -> &NewsDesk {
        &self.news
    }

    /// Build the chart and metrics for every requested symbol.
    ///
    /// Range errors abort before any fetch. A symbol that fails to load is
    /// skipped with a warning; the rest of the report is still produced.
    pub async fn build(&self, request: &DashboardRequest, today: NaiveDate) -> Result<DashboardReport> {
        request.date_range.validate(today)?;

        let timer = Timer::start("dashboard build");
        let range_label = request.date_range.range.as_str();

        let mut chart = ChartSpec::new(chart_title(range_label));
        if request.has_indicator(Indicator::Rsi) {
            chart.enable_rsi_axis();
        }

        let mut metrics = Vec::new();
        let mut series_list = Vec::new();
        let mut warnings = Vec::new();

        for symbol in request.symbols() {
            let series = match self.load_series(&symbol, &request.date_range).await {
                Ok(series) if !series.is_empty() => series,
                Ok(_) | Err(MarketDataError::NoData) => {
                    warnings.push(Notice::warning(format!("No data retrieved for {}.", symbol)));
                    continue;
                }
                Err(e) => {
                    self.logger.warn_with_error(&format!("History fetch failed for {}", symbol), &e);
                    warnings.push(Notice::warning(format!("Error fetching data for {}: {}", symbol, e)));
                    continue;
                }
            };

            let dates = series.dates();
            let closes = series.closes();

            chart.add_trace(Trace::line(
                format!("{} Close Price", symbol),
                dates.clone(),
                closes.iter().copied().map(Some).collect(),
            ));

            for indicator in Indicator::ALL.iter().filter(|i| request.has_indicator(**i)) {
                let computed = IndicatorSeries::compute(*indicator, &closes);
                let trace = Trace::line(indicator.trace_name(&symbol), dates.clone(), computed.values);
                chart.add_trace(match indicator {
                    Indicator::Sma => trace.with_dash(Dash::Dash),
                    Indicator::Ema => trace.with_dash(Dash::Dot),
                    Indicator::Rsi => trace.on_secondary_axis(),
                });
            }

            let market_cap = match self.market.ticker_info(&symbol).await {
                Ok(info) => Some(info.market_cap.unwrap_or(0.0)),
                Err(e) => {
                    warnings.push(Notice::warning(format!("Could not fetch market cap for {}: {}", symbol, e)));
                    None
                }
            };

            if let (Some(symbol_metrics), Some(last)) =
                (SymbolMetrics::from_series(&series, range_label, market_cap), series.last())
            {
                chart.add_annotation(Annotation::performance(
                    &symbol,
                    last.date,
                    last.close,
                    symbol_metrics.performance_pct,
                ));
                metrics.push(symbol_metrics);
            }

            series_list.push(series);
        }

        timer.log_elapsed("DASHBOARD");
        self.logger.info(&format!(
            "Built {} range for {} symbols ({} warnings)",
            range_label,
            series_list.len(),
            warnings.len()
        ));

        Ok(DashboardReport {
            chart,
            metrics,
            series: series_list,
            warnings,
        })
    }

    /// History for `symbol` sliced to `date_range`, anchored on its last available date
    pub async fn load_series(
        &self,
        symbol: &str,
        date_range: &DateRangeConfig,
    ) -> std::result::Result<PriceSeries, MarketDataError> {
        let points = self.market.history(symbol, date_range.fetch_window()).await?;
        let full = PriceSeries::new(symbol, points);
        let Some(anchor) = full.last_date() else {
            return Ok(full);
        };
        Ok(full.between(date_range.start_for(anchor), date_range.end_bound()))
    }

    /// Price table for export; unlike [`build`](Self::build), failures are errors
    pub async fn price_table(&self, symbol: &str, date_range: &DateRangeConfig, today: NaiveDate) -> Result<PriceSeries> {
        date_range.validate(today)?;
        Ok(self.load_series(symbol, date_range).await?)
    }

    /// Headlines for each symbol on `date`, fetched one symbol at a time
    pub async fn news(&self, symbols: &[String], date: NaiveDate, today: NaiveDate) -> Vec<SymbolNews> {
        let mut results = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            results.push(self.news.headlines(symbol, date, today).await);
        }
        results
    }
}
