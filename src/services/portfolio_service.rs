use chrono::Utc;
use tracing::{error, info, warn};

use crate::models::{AnalysisRecord, Portfolio};
use crate::services::llm_service::NarrativeGenerator;
use crate::services::market_data_service::MarketDataCache;
use crate::services::narrative_service;
use crate::services::news_service::NewsService;

/// Run one analysis pass over the portfolio.
///
/// Tickers are processed one at a time in file order and one record is
/// returned per row. A failing provider call is replaced by an inline error
/// string and never stops the pass.
pub async fn analyze_portfolio(
    portfolio: &Portfolio,
    market_data: &mut MarketDataCache,
    news: &NewsService,
    generator: &dyn NarrativeGenerator,
) -> Vec<AnalysisRecord> {
    info!("Starting analysis pass for {} tickers", portfolio.len());

    let mut records = Vec::with_capacity(portfolio.len());
    for ticker in portfolio.tickers() {
        let record = analyze_ticker(&ticker, market_data, news, generator).await;
        if record.has_errors() {
            warn!(
                "Analysis for {} finished with {} provider errors",
                ticker,
                record.provider_errors.len()
            );
        }
        records.push(record);
    }

    info!("Analysis pass complete ({} records)", records.len());
    records
}

pub async fn analyze_ticker(
    ticker: &str,
    market_data: &mut MarketDataCache,
    news: &NewsService,
    generator: &dyn NarrativeGenerator,
) -> AnalysisRecord {
    let mut provider_errors = Vec::new();

    let stock_data = match market_data.price_history(ticker).await {
        Ok(history) => history.summary(),
        Err(e) => {
            let msg = format!("Error: Unable to retrieve stock data for symbol {}. {}", ticker, e);
            provider_errors.push(msg.clone());
            msg
        }
    };

    let financial_statements = match market_data.financials(ticker).await {
        Ok(table) => table.to_string(),
        Err(e) => {
            let msg = format!(
                "Error: Unable to retrieve financial statements for symbol {}. {}",
                ticker, e
            );
            provider_errors.push(msg.clone());
            msg
        }
    };

    let recent_news = match news.recent_news(ticker).await {
        Ok(digest) => digest.to_string(),
        Err(e) => {
            let msg = format!("Error: Unable to retrieve recent news for {}. {}", ticker, e);
            provider_errors.push(msg.clone());
            msg
        }
    };

    let narrative = match narrative_service::generate_stock_analysis(
        generator,
        ticker,
        &stock_data,
        &financial_statements,
        &recent_news,
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to generate analysis for {}: {}", ticker, e);
            let msg = format!("Error: Unable to generate analysis for {}. {}", ticker, e);
            provider_errors.push(msg.clone());
            msg
        }
    };

    AnalysisRecord {
        ticker: ticker.to_string(),
        narrative,
        provider_errors,
        generated_at: Utc::now(),
    }
}
