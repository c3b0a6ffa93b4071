//! High-level API for easy library usage
//!
//! Build a [`DashboardRequest`] and hand it to a [`Dashboard`].

pub mod builder;
pub mod dashboard;

pub use builder::{normalize_symbol, split_list, DashboardRequest, DashboardRequestBuilder};
pub use dashboard::{chart_title, Dashboard, DashboardReport};
