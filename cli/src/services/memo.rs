use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{HistoryWindow, PricePoint, TickerInfo};

type HistoryKey = (String, HistoryWindow);

/// Process-wide memoization of successful history lookups keyed by their
/// arguments. Entries live for the lifetime of the process; failures are
/// never stored.
pub struct MemoizedProvider<P> {
    inner: P,
    history: Mutex<HashMap<HistoryKey, Arc<Vec<PricePoint>>>>,
}

impl<P: MarketDataProvider> MemoizedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            history: Mutex::new(HashMap::new()),
        }
    }

    pub async fn memoized_entries(&self) -> usize {
        self.history.lock().await.len()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for MemoizedProvider<P> {
    async fn history(
        &self,
        symbol: &str,
        window: HistoryWindow,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let key = (symbol.to_string(), window);
        if let Some(points) = self.history.lock().await.get(&key) {
            tracing::debug!(symbol, "History served from memo");
            return Ok(points.as_ref().clone());
        }

        // Lock is not held across the fetch; concurrent misses may both fetch
        let points = self.inner.history(symbol, window).await?;
        self.history
            .lock()
            .await
            .insert(key, Arc::new(points.clone()));
        Ok(points)
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
        self.inner.ticker_info(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        async fn history(
            &self,
            _symbol: &str,
            _window: HistoryWindow,
        ) -> Result<Vec<PricePoint>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MarketDataError::NoData);
            }
            let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
            Ok(vec![PricePoint::new(date, 1.0, 1.0, 1.0, 1.0, 10)])
        }

        async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
            Ok(TickerInfo {
                symbol: symbol.to_string(),
                long_name: None,
                exchange: None,
                market_cap: None,
            })
        }
    }

    #[tokio::test]
    async fn test_history_memoized_per_arguments() {
        let memo = MemoizedProvider::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });

        memo.history("AAPL", HistoryWindow::full()).await.unwrap();
        memo.history("AAPL", HistoryWindow::full()).await.unwrap();
        assert_eq!(memo.inner().calls.load(Ordering::SeqCst), 1);

        memo.history("MSFT", HistoryWindow::full()).await.unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        memo.history("AAPL", HistoryWindow::between(start, None)).await.unwrap();
        assert_eq!(memo.inner().calls.load(Ordering::SeqCst), 3);
        assert_eq!(memo.memoized_entries().await, 3);
    }

    #[tokio::test]
    async fn test_failures_not_memoized() {
        let memo = MemoizedProvider::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        assert!(memo.history("AAPL", HistoryWindow::full()).await.is_err());
        assert!(memo.history("AAPL", HistoryWindow::full()).await.is_err());
        assert_eq!(memo.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.memoized_entries().await, 0);
    }
}
