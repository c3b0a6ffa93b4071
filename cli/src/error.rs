use chrono::NaiveDate;

use crate::services::market_data::MarketDataError;
use crate::services::news_service::NewsError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Invalid date range: start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown time range '{0}'")]
    UnknownTimeRange(String),

    #[error("Unknown indicator '{0}' (expected SMA, EMA or RSI)")]
    UnknownIndicator(String),

    #[error("Invalid stock symbol '{0}'")]
    InvalidSymbol(String),

    #[error("At most {max} comparison symbols can be selected, got {got}")]
    TooManyComparisons { max: usize, got: usize },

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    News(#[from] NewsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// True for errors caused by the caller's input rather than an upstream failure
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DashboardError::InvalidRange { .. }
                | DashboardError::UnknownTimeRange(_)
                | DashboardError::UnknownIndicator(_)
                | DashboardError::InvalidSymbol(_)
                | DashboardError::TooManyComparisons { .. }
                | DashboardError::InvalidDate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
