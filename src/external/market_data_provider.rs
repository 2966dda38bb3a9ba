use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{FinancialTable, PriceHistory};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Up to five years of daily closes, ascending by date.
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, ProviderError>;

    /// Quarterly income statement figures.
    async fn fetch_financials(&self, ticker: &str) -> Result<FinancialTable, ProviderError>;
}
