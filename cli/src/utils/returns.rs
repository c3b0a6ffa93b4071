use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::format::format_ratio_as_percent;

/// Days per year used to convert day counts into years
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Compound annual growth rate; 0 for non-positive prices or duration
pub fn calculate_cagr(start_value: f64, end_value: f64, num_years: f64) -> f64 {
    if num_years <= 0.0 {
        return 0.0;
    }
    if start_value <= 0.0 || end_value <= 0.0 {
        return 0.0;
    }
    (end_value / start_value).powf(1.0 / num_years) - 1.0
}

/// Annualized return for horizons shorter than a year; 0 for degenerate input
pub fn calculate_annualized_return(start_value: f64, end_value: f64, num_days: i64) -> f64 {
    if num_days <= 0 || start_value <= 0.0 || end_value <= 0.0 {
        return 0.0;
    }
    (end_value / start_value).powf(DAYS_PER_YEAR / num_days as f64) - 1.0
}

/// Price change in percent; 0 when the start price is not positive
pub fn performance_pct(start_price: f64, end_price: f64) -> f64 {
    if start_price <= 0.0 {
        return 0.0;
    }
    (end_price - start_price) / start_price * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    Cagr,
    AnnualizedReturn,
}

/// Growth metric for a period: CAGR from one year up, annualized return below
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetric {
    pub kind: ReturnKind,
    /// Fraction, e.g. `0.12` for 12%
    pub value: f64,
    pub years: f64,
    pub days: i64,
}

impl ReturnMetric {
    pub fn for_period(
        start_price: f64,
        end_price: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let days = (end_date - start_date).num_days();
        let years = days as f64 / DAYS_PER_YEAR;

        if years < 1.0 {
            Self {
                kind: ReturnKind::AnnualizedReturn,
                value: calculate_annualized_return(start_price, end_price, days),
                years,
                days,
            }
        } else {
            Self {
                kind: ReturnKind::Cagr,
                value: calculate_cagr(start_price, end_price, years),
                years,
                days,
            }
        }
    }

    /// `CAGR (5 Years)` or `Annualized Return (YTD)`
    pub fn label(&self, range_label: &str) -> String {
        match self.kind {
            ReturnKind::Cagr => format!("CAGR ({})", range_label),
            ReturnKind::AnnualizedReturn => format!("Annualized Return ({})", range_label),
        }
    }

    pub fn display_value(&self) -> String {
        format_ratio_as_percent(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_cagr_formula() {
        assert!(approx(calculate_cagr(100.0, 121.0, 2.0), 0.1));
        assert!(approx(calculate_cagr(100.0, 50.0, 1.0), -0.5));
        let expected = (250.0f64 / 80.0).powf(1.0 / 3.7) - 1.0;
        assert!(approx(calculate_cagr(80.0, 250.0, 3.7), expected));
    }

    #[test]
    fn test_cagr_degenerate_inputs() {
        assert_eq!(calculate_cagr(100.0, 120.0, 0.0), 0.0);
        assert_eq!(calculate_cagr(100.0, 120.0, -1.0), 0.0);
        assert_eq!(calculate_cagr(0.0, 120.0, 2.0), 0.0);
        assert_eq!(calculate_cagr(100.0, -5.0, 2.0), 0.0);
    }

    #[test]
    fn test_annualized_return() {
        let expected = (110.0f64 / 100.0).powf(365.25 / 73.0) - 1.0;
        assert!(approx(calculate_annualized_return(100.0, 110.0, 73), expected));
        assert_eq!(calculate_annualized_return(100.0, 110.0, 0), 0.0);
        assert_eq!(calculate_annualized_return(-1.0, 110.0, 10), 0.0);
        assert_eq!(calculate_annualized_return(100.0, 0.0, 10), 0.0);
    }

    #[test]
    fn test_performance_pct() {
        assert!(approx(performance_pct(100.0, 112.5), 12.5));
        assert!(approx(performance_pct(200.0, 150.0), -25.0));
        assert_eq!(performance_pct(0.0, 150.0), 0.0);
    }

    #[test]
    fn test_return_metric_switches_at_one_year() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let short = ReturnMetric::for_period(100.0, 110.0, start, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(short.kind, ReturnKind::AnnualizedReturn);
        assert_eq!(short.days, 364);
        assert_eq!(short.label("1 Year"), "Annualized Return (1 Year)");

        // 2023-01-01 .. 2024-01-02 is 366 days, just over 365.25
        let long = ReturnMetric::for_period(100.0, 110.0, start, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(long.kind, ReturnKind::Cagr);
        assert!(approx(long.value, calculate_cagr(100.0, 110.0, 366.0 / 365.25)));
        assert_eq!(long.label("Maximum"), "CAGR (Maximum)");
    }

    #[test]
    fn test_return_metric_display() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let metric = ReturnMetric::for_period(100.0, 121.0, start, end);
        // 731 days -> slightly more than 2 years
        assert_eq!(metric.kind, ReturnKind::Cagr);
        assert!(metric.display_value().ends_with('%'));
    }
}
