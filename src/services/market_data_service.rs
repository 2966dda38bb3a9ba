use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ProviderError;
use crate::external::market_data_provider::MarketDataProvider;
use crate::models::{FinancialTable, PriceHistory};

/// Which provider call a cached value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    PriceHistory,
    Financials,
}

#[derive(Debug, Clone)]
enum CachedValue {
    PriceHistory(Arc<PriceHistory>),
    Financials(Arc<FinancialTable>),
}

/// Memoizes market data fetches keyed by (fetch kind, symbol).
///
/// Successful results live as long as the cache (one session) and are never
/// evicted. Failures are not stored, so the next call asks the provider again.
pub struct MarketDataCache {
    provider: Arc<dyn MarketDataProvider>,
    entries: HashMap<(FetchKind, String), CachedValue>,
}

impl MarketDataCache {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
        }
    }

    pub async fn price_history(&mut self, ticker: &str) -> Result<Arc<PriceHistory>, ProviderError> {
        let key = (FetchKind::PriceHistory, ticker.to_string());
        if let Some(CachedValue::PriceHistory(history)) = self.entries.get(&key) {
            debug!("Price history cache hit for {}", ticker);
            return Ok(Arc::clone(history));
        }

        let history = Arc::new(self.provider.fetch_price_history(ticker).await?);
        info!("Cached price history for {} ({} closes)", ticker, history.series.len());
        self.entries
            .insert(key, CachedValue::PriceHistory(Arc::clone(&history)));
        Ok(history)
    }

    pub async fn financials(&mut self, ticker: &str) -> Result<Arc<FinancialTable>, ProviderError> {
        let key = (FetchKind::Financials, ticker.to_string());
        if let Some(CachedValue::Financials(table)) = self.entries.get(&key) {
            debug!("Financials cache hit for {}", ticker);
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.provider.fetch_financials(ticker).await?);
        info!("Cached financials for {}", ticker);
        self.entries
            .insert(key, CachedValue::Financials(Arc::clone(&table)));
        Ok(table)
    }

    pub fn is_cached(&self, kind: FetchKind, ticker: &str) -> bool {
        self.entries.contains_key(&(kind, ticker.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricePoint, PriceSeries};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        price_calls: AtomicUsize,
        financial_calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, ProviderError> {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            if ticker == "BAD" {
                return Err(ProviderError::NotFound);
            }
            let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
            Ok(PriceHistory::new(ticker, PriceSeries::new(vec![PricePoint::new(date, 10.0)])))
        }

        async fn fetch_financials(&self, ticker: &str) -> Result<FinancialTable, ProviderError> {
            self.financial_calls.fetch_add(1, Ordering::SeqCst);
            Ok(FinancialTable::new(ticker))
        }
    }

    #[tokio::test]
    async fn test_repeat_calls_hit_the_cache() {
        let provider = Arc::new(CountingProvider::default());
        let mut cache = MarketDataCache::new(provider.clone());

        cache.price_history("MSFT").await.unwrap();
        cache.price_history("MSFT").await.unwrap();
        cache.financials("MSFT").await.unwrap();
        cache.financials("MSFT").await.unwrap();

        assert_eq!(provider.price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.financial_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_kinds_are_cached_separately() {
        let provider = Arc::new(CountingProvider::default());
        let mut cache = MarketDataCache::new(provider);

        cache.price_history("AAPL").await.unwrap();
        assert!(cache.is_cached(FetchKind::PriceHistory, "AAPL"));
        assert!(!cache.is_cached(FetchKind::Financials, "AAPL"));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let provider = Arc::new(CountingProvider::default());
        let mut cache = MarketDataCache::new(provider.clone());

        assert!(cache.price_history("BAD").await.is_err());
        assert!(cache.price_history("BAD").await.is_err());

        assert_eq!(provider.price_calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
