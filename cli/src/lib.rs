//! # stockdash - stock price dashboard library
//!
//! Price history, technical indicators and return metrics for a handful of
//! symbols, plus dated news headlines with a historical archive fallback:
//! - SMA / EMA / RSI series aligned with the price dates
//! - CAGR or annualized return, performance and market capitalization
//! - A Plotly chart description ready for the browser
//! - CSV export of price tables and headlines
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockdash::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let market = Arc::new(MemoizedProvider::new(YahooFinanceClient::new(true)?));
//!     let news = NewsDesk::new(None, Arc::new(HistoricalNews::empty()), "AAPL");
//!     let dashboard = Dashboard::new(market, news);
//!
//!     let request = DashboardRequestBuilder::new()
//!         .with_symbol("AAPL")
//!         .add_comparison("MSFT")
//!         .with_range(TimeRange::OneYear)
//!         .build()?;
//!     let report = dashboard.build(&request, today_in(MARKET_TIMEZONE)).await?;
//!     println!("{} traces, {} warnings", report.chart.data.len(), report.warnings.len());
//!     Ok(())
//! }
//! ```

// Core modules - these contain the main functionality
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Analysis modules - the calculations behind the chart and the data section
pub mod analysis {
    //! Calculations over closing prices

    /// Moving averages and relative strength
    pub mod indicators {
        pub use crate::utils::indicators::*;
    }

    /// Growth and performance figures
    pub mod returns {
        pub use crate::utils::returns::*;
    }
}

// Public API for easy library usage
pub mod api;

// Prelude for convenient imports
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use stockdash::prelude::*;
    //! ```

    pub use crate::api::{Dashboard, DashboardReport, DashboardRequest, DashboardRequestBuilder};
    pub use crate::error::DashboardError;
    pub use crate::models::{DateRangeConfig, PriceSeries, SymbolMetrics, SymbolNews, TimeRange};
    pub use crate::services::{
        HistoricalNews, MarketDataProvider, MemoizedProvider, NewsApiClient, NewsDesk, NewsProvider,
        YahooFinanceClient,
    };
    pub use crate::utils::{today_in, Indicator, MARKET_TIMEZONE};
}

// Re-export some commonly used utilities
pub use utils::{init_logger, Logger, Timer};
