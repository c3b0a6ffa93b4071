use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of a symbol's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check if this point has the same date as another
    pub fn same_date(&self, other: &PricePoint) -> bool {
        self.date == other.date
    }
}

/// Ordered daily history for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, sorting by date and keeping the last row for duplicate dates.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by(|a, b| a.date.cmp(&b.date));
        points.dedup_by(|later, earlier| {
            if later.same_date(earlier) {
                *earlier = later.clone();
                true
            } else {
                false
            }
        });
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Date of the newest point; the anchor for named time ranges.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last().map(|p| p.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Inclusive slice from `start`; the whole series when `start` is `None`.
    pub fn since(&self, start: Option<NaiveDate>) -> PriceSeries {
        let points = match start {
            Some(start) => self
                .points
                .iter()
                .filter(|p| p.date >= start)
                .cloned()
                .collect(),
            None => self.points.clone(),
        };
        PriceSeries {
            symbol: self.symbol.clone(),
            points,
        }
    }

    /// Points between `start` and `end`, both inclusive and both optional.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PriceSeries {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s))
            .filter(|p| end.map_or(true, |e| p.date <= e))
            .cloned()
            .collect();
        PriceSeries {
            symbol: self.symbol.clone(),
            points,
        }
    }
}
