//! Technical indicators over a series of closing prices.
//!
//! Every function returns one value per input close so results line up with
//! the price dates. `None` marks the warm-up region where the trailing window
//! is not yet full.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

pub const SMA_WINDOW: usize = 20;
pub const EMA_SPAN: usize = 50;
pub const RSI_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Indicator {
    Sma,
    Ema,
    Rsi,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Sma, Indicator::Ema, Indicator::Rsi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Sma => "SMA",
            Indicator::Ema => "EMA",
            Indicator::Rsi => "RSI",
        }
    }

    /// Window (SMA, RSI) or span (EMA) the dashboard uses
    pub fn default_window(&self) -> usize {
        match self {
            Indicator::Sma => SMA_WINDOW,
            Indicator::Ema => EMA_SPAN,
            Indicator::Rsi => RSI_WINDOW,
        }
    }

    pub fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let window = self.default_window();
        match self {
            Indicator::Sma => calculate_sma(closes, window),
            Indicator::Ema => calculate_ema(closes, window).into_iter().map(Some).collect(),
            Indicator::Rsi => calculate_rsi(closes, window),
        }
    }

    /// Legend label, e.g. `AAPL 20-day SMA`
    pub fn trace_name(&self, symbol: &str) -> String {
        format!("{} {}-day {}", symbol, self.default_window(), self.as_str())
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(Indicator::Sma),
            "EMA" => Ok(Indicator::Ema),
            "RSI" => Ok(Indicator::Rsi),
            _ => Err(DashboardError::UnknownIndicator(s.to_string())),
        }
    }
}

/// Computed indicator values aligned with the price dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub indicator: Indicator,
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn compute(indicator: Indicator, closes: &[f64]) -> Self {
        Self {
            indicator,
            window: indicator.default_window(),
            values: indicator.compute(closes),
        }
    }
}

/// Unweighted mean of the trailing `window` closes
pub fn calculate_sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    let mut result = Vec::with_capacity(closes.len());
    let mut win: VecDeque<f64> = VecDeque::with_capacity(window + 1);
    let mut sum = 0.0;

    for &close in closes {
        sum += close;
        win.push_back(close);
        if win.len() > window {
            if let Some(old) = win.pop_front() {
                sum -= old;
            }
        }
        if win.len() == window {
            result.push(Some(sum / window as f64));
        } else {
            result.push(None);
        }
    }

    result
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`, seeded with the
/// first close and no bias adjustment
pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(closes.len());
    let mut last: Option<f64> = None;

    for &close in closes {
        let value = match last {
            Some(prev) => alpha * close + (1.0 - alpha) * prev,
            None => close,
        };
        last = Some(value);
        result.push(value);
    }

    result
}

/// Relative strength index from trailing simple means of gains and losses.
///
/// The first delta counts as zero, so the first value appears at index
/// `window - 1`. A window with gains but no losses reads 100; a flat window
/// reads 50.
pub fn calculate_rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if closes.is_empty() {
        return Vec::new();
    }

    let deltas: Vec<f64> = std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| w[1] - w[0]))
        .collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let avg_gain = calculate_sma(&gains, window);
    let avg_loss = calculate_sma(&losses, window);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) => Some(rsi_from_averages(gain, loss)),
            _ => None,
        })
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { 50.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Parse a comma separated indicator list such as `"SMA,rsi"`; empty entries are skipped
pub fn parse_indicator_list(input: &str) -> Result<Vec<Indicator>, DashboardError> {
    let mut indicators = Vec::new();
    for part in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let indicator: Indicator = part.parse()?;
        if !indicators.contains(&indicator) {
            indicators.push(indicator);
        }
    }
    Ok(indicators)
}
