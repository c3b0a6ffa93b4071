use serde::{Deserialize, Serialize};

/// Descriptive metadata for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,
    pub long_name: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
}

/// Symbol lookup result; unknown fields are reported as "N/A"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
}

impl From<TickerInfo> for SearchResult {
    fn from(info: TickerInfo) -> Self {
        Self {
            symbol: info.symbol,
            name: info.long_name.unwrap_or_else(|| "N/A".to_string()),
            exchange: info.exchange.unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// Comparison symbols offered next to the primary one
pub const DEFAULT_COMPARISON_SYMBOLS: [&str; 5] = ["GOOGL", "MSFT", "AMZN", "META", "TSLA"];

/// Default primary symbol
pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Maximum number of comparison symbols next to the primary one
pub const MAX_COMPARISONS: usize = 3;
