use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::{
    error::DashboardError,
    models::HistoricalHeadline,
    utils::{parse_date, Logger},
};

/// Date-keyed headline archive loaded once at startup.
///
/// File format: header row, then `date,title,description` with `YYYY-MM-DD`
/// dates. A later row for the same date replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct HistoricalNews {
    entries: BTreeMap<NaiveDate, HistoricalHeadline>,
}

impl HistoricalNews {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_headlines(headlines: impl IntoIterator<Item = HistoricalHeadline>) -> Self {
        Self {
            entries: headlines.into_iter().map(|h| (h.date, h)).collect(),
        }
    }

    /// Parse CSV content; rows with too few columns or a bad date are skipped
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DashboardError> {
        let logger = Logger::new("HISTORICAL_NEWS");
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries = BTreeMap::new();
        let mut skipped = 0usize;

        for record in csv_reader.records() {
            let record = record?;
            let (Some(date), Some(title), Some(description)) = (record.get(0), record.get(1), record.get(2)) else {
                skipped += 1;
                continue;
            };
            let Ok(date) = parse_date(date) else {
                skipped += 1;
                continue;
            };
            entries.insert(
                date,
                HistoricalHeadline {
                    date,
                    title: title.to_string(),
                    description: description.to_string(),
                },
            );
        }

        if skipped > 0 {
            logger.warn(&format!("Skipped {} malformed rows", skipped));
        }

        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let file = std::fs::File::open(path)?;
        let news = Self::from_reader(std::io::BufReader::new(file))?;
        Logger::new("HISTORICAL_NEWS").info(&format!(
            "Loaded {} archived headlines from {}",
            news.len(),
            path.display()
        ));
        Ok(news)
    }

    /// Like [`load`](Self::load) but degrades to an empty archive with a warning
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(news) => news,
            Err(e) => {
                Logger::new("HISTORICAL_NEWS").warn(&format!(
                    "Historical news unavailable ({}): {}",
                    path.display(),
                    e
                ));
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&HistoricalHeadline> {
        self.entries.get(&date)
    }

    /// Exact entry for `date`, otherwise the entry with the smallest absolute
    /// day distance. Equidistant neighbours resolve to the earlier date.
    pub fn lookup(&self, date: NaiveDate) -> Option<&HistoricalHeadline> {
        let before = self.entries.range(..=date).next_back();
        let after = self.entries.range(date..).next();

        match (before, after) {
            (Some((before_date, headline)), _) if *before_date == date => Some(headline),
            (Some((before_date, earlier)), Some((after_date, later))) => {
                if date - *before_date <= *after_date - date {
                    Some(earlier)
                } else {
                    Some(later)
                }
            }
            (Some((_, headline)), None) | (None, Some((_, headline))) => Some(headline),
            (None, None) => None,
        }
    }
}
