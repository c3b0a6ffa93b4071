use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1 Day")]
    OneDay,
    #[serde(rename = "7 Days")]
    SevenDays,
    #[serde(rename = "MTD")]
    MonthToDate,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1 Year")]
    OneYear,
    #[serde(rename = "5 Years")]
    FiveYears,
    #[serde(rename = "10 Years")]
    TenYears,
    #[serde(rename = "15 Years")]
    FifteenYears,
    #[serde(rename = "20 Years")]
    TwentyYears,
    #[serde(rename = "Maximum")]
    Maximum,
    #[serde(rename = "Custom")]
    Custom,
}

impl TimeRange {
    /// Selection order shown to users
    pub const ALL: [TimeRange; 12] = [
        TimeRange::OneDay,
        TimeRange::SevenDays,
        TimeRange::MonthToDate,
        TimeRange::SixMonths,
        TimeRange::YearToDate,
        TimeRange::OneYear,
        TimeRange::FiveYears,
        TimeRange::TenYears,
        TimeRange::FifteenYears,
        TimeRange::TwentyYears,
        TimeRange::Maximum,
        TimeRange::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1 Day",
            TimeRange::SevenDays => "7 Days",
            TimeRange::MonthToDate => "MTD",
            TimeRange::SixMonths => "6M",
            TimeRange::YearToDate => "YTD",
            TimeRange::OneYear => "1 Year",
            TimeRange::FiveYears => "5 Years",
            TimeRange::TenYears => "10 Years",
            TimeRange::FifteenYears => "15 Years",
            TimeRange::TwentyYears => "20 Years",
            TimeRange::Maximum => "Maximum",
            TimeRange::Custom => "Custom",
        }
    }

    /// Start of the window ending at `anchor`.
    ///
    /// `Maximum` has no lower bound. `Custom` uses `custom_start`, falling back
    /// to one year before the anchor.
    pub fn start_date(&self, anchor: NaiveDate, custom_start: Option<NaiveDate>) -> Option<NaiveDate> {
        let days_back = |days: i64| Some(anchor - Duration::days(days));
        match self {
            TimeRange::OneDay => days_back(1),
            TimeRange::SevenDays => days_back(7),
            TimeRange::MonthToDate => anchor.with_day(1),
            TimeRange::SixMonths => days_back(180),
            TimeRange::YearToDate => NaiveDate::from_ymd_opt(anchor.year(), 1, 1),
            TimeRange::OneYear => days_back(365),
            TimeRange::FiveYears => days_back(365 * 5),
            TimeRange::TenYears => days_back(365 * 10),
            TimeRange::FifteenYears => days_back(365 * 15),
            TimeRange::TwentyYears => days_back(365 * 20),
            TimeRange::Maximum => None,
            TimeRange::Custom => Some(custom_start.unwrap_or(anchor - Duration::days(365))),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        let range = match normalized.as_str() {
            "1 DAY" | "1D" => TimeRange::OneDay,
            "7 DAYS" | "7D" => TimeRange::SevenDays,
            "MTD" => TimeRange::MonthToDate,
            "6M" | "6 MONTHS" => TimeRange::SixMonths,
            "YTD" => TimeRange::YearToDate,
            "1 YEAR" | "1Y" => TimeRange::OneYear,
            "5 YEARS" | "5Y" => TimeRange::FiveYears,
            "10 YEARS" | "10Y" => TimeRange::TenYears,
            "15 YEARS" | "15Y" => TimeRange::FifteenYears,
            "20 YEARS" | "20Y" => TimeRange::TwentyYears,
            "MAXIMUM" | "MAX" | "ALL" => TimeRange::Maximum,
            "CUSTOM" => TimeRange::Custom,
            _ => return Err(DashboardError::UnknownTimeRange(s.to_string())),
        };
        Ok(range)
    }
}

/// Inclusive bounds handed to a market-data provider; both `None` means full history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl HistoryWindow {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// A user's range selection: a named window, or explicit bounds for `Custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangeConfig {
    pub range: TimeRange,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRangeConfig {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            start_date: None,
            end_date: None,
        }
    }

    pub fn custom(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            range: TimeRange::Custom,
            start_date,
            end_date,
        }
    }

    pub fn default_ytd() -> Self {
        Self::new(TimeRange::YearToDate)
    }

    /// Rejects a custom start that falls after its end (or after `today` when open-ended).
    pub fn validate(&self, today: NaiveDate) -> Result<(), DashboardError> {
        if self.range != TimeRange::Custom {
            return Ok(());
        }
        let end = self.end_date.unwrap_or(today);
        if let Some(start) = self.start_date {
            if start > end {
                return Err(DashboardError::InvalidRange { start, end });
            }
        }
        Ok(())
    }

    /// What to ask the provider for. Named ranges depend on the series' last
    /// date, so they fetch everything; explicit custom bounds are passed through.
    pub fn fetch_window(&self) -> HistoryWindow {
        match (self.range, self.start_date) {
            (TimeRange::Custom, Some(start)) => HistoryWindow::between(Some(start), self.end_date),
            (TimeRange::Custom, None) => HistoryWindow::between(None, self.end_date),
            _ => HistoryWindow::full(),
        }
    }

    /// Start date for a series whose newest point is `anchor`.
    pub fn start_for(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        self.range.start_date(anchor, self.start_date)
    }

    /// Upper bound applied when slicing; only custom ranges carry one.
    pub fn end_bound(&self) -> Option<NaiveDate> {
        match self.range {
            TimeRange::Custom => self.end_date,
            _ => None,
        }
    }
}

impl Default for DateRangeConfig {
    fn default() -> Self {
        Self::default_ytd()
    }
}
