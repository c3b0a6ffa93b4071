use serde::{Deserialize, Serialize};

use super::price::PriceSeries;
use crate::utils::{format_market_cap, format_percent, format_price, performance_pct, ReturnMetric};

/// Key figures shown for one symbol over the selected range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetrics {
    pub symbol: String,
    pub current_price: f64,
    pub performance_pct: f64,
    pub return_metric: ReturnMetric,
    /// `None` when the metadata lookup failed
    pub market_cap: Option<f64>,
    pub display: MetricsDisplay,
}

/// Preformatted strings for the data section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDisplay {
    pub current_price: String,
    pub performance: String,
    pub return_label: String,
    pub return_value: String,
    pub market_cap: String,
}

impl SymbolMetrics {
    /// Metrics for an already sliced series; `None` for an empty series
    pub fn from_series(series: &PriceSeries, range_label: &str, market_cap: Option<f64>) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;

        let performance = performance_pct(first.close, last.close);
        let return_metric = ReturnMetric::for_period(first.close, last.close, first.date, last.date);

        let display = MetricsDisplay {
            current_price: format_price(last.close),
            performance: format_percent(performance),
            return_label: return_metric.label(range_label),
            return_value: return_metric.display_value(),
            market_cap: market_cap.map_or_else(|| "N/A".to_string(), format_market_cap),
        };

        Some(Self {
            symbol: series.symbol.clone(),
            current_price: last.close,
            performance_pct: performance,
            return_metric,
            market_cap,
            display,
        })
    }
}
