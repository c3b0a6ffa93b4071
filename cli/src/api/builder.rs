//! Builder for validated dashboard requests

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{DashboardError, Result};
use crate::models::{DateRangeConfig, TimeRange, DEFAULT_SYMBOL, MAX_COMPARISONS};
use crate::utils::Indicator;

const SYMBOL_PATTERN: &str = r"^[A-Z0-9.\-^=]{1,15}$";

fn symbol_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SYMBOL_PATTERN).ok()).as_ref()
}

/// Trim and upper-case `raw`, rejecting anything that is not a ticker
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol_regex().is_some_and(|re| re.is_match(&symbol)) {
        Ok(symbol)
    } else {
        Err(DashboardError::InvalidSymbol(raw.to_string()))
    }
}

/// Split repeated and comma separated values into one flat list
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A validated dashboard request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub symbol: String,
    pub comparisons: Vec<String>,
    pub date_range: DateRangeConfig,
    pub indicators: Vec<Indicator>,
}

impl DashboardRequest {
    pub fn builder() -> DashboardRequestBuilder {
        DashboardRequestBuilder::new()
    }

    /// Primary symbol followed by the comparisons, in display order
    pub fn symbols(&self) -> Vec<String> {
        std::iter::once(self.symbol.clone())
            .chain(self.comparisons.iter().cloned())
            .collect()
    }

    pub fn has_indicator(&self, indicator: Indicator) -> bool {
        self.indicators.contains(&indicator)
    }
}

/// Fluent setup for [`DashboardRequest`]
///
/// ```rust
/// use stockdash::api::DashboardRequestBuilder;
/// use stockdash::models::TimeRange;
///
/// let request = DashboardRequestBuilder::new()
///     .with_symbol("aapl")
///     .add_comparison("MSFT")
///     .with_range(TimeRange::OneYear)
///     .build()
///     .unwrap();
/// assert_eq!(request.symbols(), vec!["AAPL", "MSFT"]);
/// ```
#[derive(Debug, Clone)]
pub struct DashboardRequestBuilder {
    symbol: String,
    comparisons: Vec<String>,
    range: TimeRange,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    indicators: Option<Vec<Indicator>>,
}

impl DashboardRequestBuilder {
    pub fn new() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            comparisons: Vec::new(),
            range: TimeRange::YearToDate,
            start_date: None,
            end_date: None,
            indicators: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn with_comparisons(mut self, comparisons: Vec<String>) -> Self {
        self.comparisons = comparisons;
        self
    }

    pub fn add_comparison(mut self, symbol: impl Into<String>) -> Self {
        self.comparisons.push(symbol.into());
        self
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    /// Explicit bounds; only honoured for [`TimeRange::Custom`]
    pub fn with_custom_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_indicators(mut self, indicators: Vec<Indicator>) -> Self {
        self.indicators = Some(indicators);
        self
    }

    /// Normalize symbols and check limits. Comparisons equal to the primary
    /// symbol or repeated are dropped before the limit is applied.
    pub fn build(self) -> Result<DashboardRequest> {
        let symbol = normalize_symbol(&self.symbol)?;

        let mut comparisons: Vec<String> = Vec::new();
        for raw in &self.comparisons {
            let comparison = normalize_symbol(raw)?;
            if comparison != symbol && !comparisons.contains(&comparison) {
                comparisons.push(comparison);
            }
        }
        if comparisons.len() > MAX_COMPARISONS {
            return Err(DashboardError::TooManyComparisons {
                max: MAX_COMPARISONS,
                got: comparisons.len(),
            });
        }

        let date_range = match self.range {
            TimeRange::Custom => DateRangeConfig::custom(self.start_date, self.end_date),
            range => DateRangeConfig::new(range),
        };

        let mut indicators: Vec<Indicator> = Vec::new();
        for indicator in self.indicators.unwrap_or_else(|| vec![Indicator::Sma]) {
            if !indicators.contains(&indicator) {
                indicators.push(indicator);
            }
        }

        Ok(DashboardRequest {
            symbol,
            comparisons,
            date_range,
            indicators,
        })
    }
}

impl Default for DashboardRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
