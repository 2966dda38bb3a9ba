use std::sync::Arc;

use tokio::net::TcpListener;

use portfolio_advisor::app;
use portfolio_advisor::config::ServerConfig;
use portfolio_advisor::external::market_data_provider::MarketDataProvider;
use portfolio_advisor::external::yahoofinance::YahooFinanceProvider;
use portfolio_advisor::logging::{init_logging, LoggingConfig};
use portfolio_advisor::services::llm_service::{LlmConfig, LlmService};
use portfolio_advisor::services::news_service::{NewsConfig, NewsService};
use portfolio_advisor::state::AppState;
use portfolio_advisor::store::sessions::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let server_config = ServerConfig::from_env()?;

    let market_data: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceProvider::new());
    tracing::info!("📊 Using market data provider: Yahoo Finance");

    let llm_service = LlmService::new(LlmConfig::from_env());

    let news_service = NewsService::new(NewsConfig::from_env())?;

    let state = AppState {
        sessions: SessionStore::new(market_data),
        news_service: Arc::new(news_service),
        llm_service: Arc::new(llm_service),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&server_config.bind_addr).await?;
    tracing::info!("🚀 Portfolio advisor running at http://{}/", server_config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
