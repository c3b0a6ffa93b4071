use crate::{
    error::Result,
    models::{PriceSeries, SymbolNews},
    utils::format_date,
};

pub const PRICE_HEADERS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];
pub const NEWS_HEADERS: [&str; 6] = ["symbol", "published_at", "title", "description", "url", "source"];

/// Price rows as CSV, one line per trading day in date order
pub fn prices_to_csv(series: &PriceSeries) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PRICE_HEADERS)?;

    for point in &series.points {
        writer.write_record([
            format_date(point.date),
            point.open.to_string(),
            point.high.to_string(),
            point.low.to_string(),
            point.close.to_string(),
            point.volume.to_string(),
        ])?;
    }

    finish(writer)
}

/// Headlines of every symbol as CSV; symbols without articles contribute no rows
pub fn news_to_csv(news: &[SymbolNews]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(NEWS_HEADERS)?;

    for entry in news {
        for article in &entry.articles {
            writer.write_record([
                entry.symbol.as_str(),
                article.published_at.as_str(),
                article.title.as_str(),
                article.description.as_deref().unwrap_or(""),
                article.url.as_deref().unwrap_or(""),
                article.source_name.as_deref().unwrap_or(""),
            ])?;
        }
    }

    finish(writer)
}

/// Suggested download name, e.g. `AAPL_prices.csv`
pub fn export_file_name(symbol: &str, kind: &str) -> String {
    format!("{}_{}.csv", symbol, kind)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsArticle, NewsSource, PricePoint};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_prices_to_csv() {
        let series = PriceSeries::new(
            "AAPL",
            vec![
                PricePoint::new(date(2024, 1, 3), 184.2, 185.8, 183.4, 184.25, 58_414_500),
                PricePoint::new(date(2024, 1, 2), 187.1, 188.4, 183.8, 185.64, 82_488_700),
            ],
        );
        let csv = String::from_utf8(prices_to_csv(&series).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "2024-01-02,187.1,188.4,183.8,185.64,82488700");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_series_has_header_only() {
        let csv = prices_to_csv(&PriceSeries::new("AAPL", Vec::new())).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "Date,Open,High,Low,Close,Volume\n");
    }

    #[test]
    fn test_news_to_csv_quotes_fields() {
        let news = vec![
            SymbolNews {
                symbol: "AAPL".to_string(),
                date: date(2024, 3, 1),
                source: NewsSource::Remote,
                articles: vec![NewsArticle {
                    title: "Apple, Inc. beats".to_string(),
                    description: None,
                    published_at: "2024-03-01T10:00:00Z".to_string(),
                    url: Some("https://example.com".to_string()),
                    source_name: Some("Reuters".to_string()),
                }],
                notices: Vec::new(),
            },
            SymbolNews {
                symbol: "MSFT".to_string(),
                date: date(2024, 3, 1),
                source: NewsSource::None,
                articles: Vec::new(),
                notices: Vec::new(),
            },
        ];
        let csv = String::from_utf8(news_to_csv(&news).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "AAPL,2024-03-01T10:00:00Z,\"Apple, Inc. beats\",,https://example.com,Reuters"
        );
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("AAPL", "prices"), "AAPL_prices.csv");
    }
}
