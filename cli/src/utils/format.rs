/// Abbreviate a market capitalization with T/B/M suffixes and two decimals
pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{:.2}", value)
    }
}

/// `$123.45`
pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Render a value already expressed in percent: `12.345` -> `12.35%`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Render a fraction as percent: `0.12345` -> `12.35%`
pub fn format_ratio_as_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}
