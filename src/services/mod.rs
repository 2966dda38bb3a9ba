pub mod csv_import_service;
pub mod llm_service;
pub mod market_data_service;
pub mod narrative_service;
pub mod news_service;
pub mod portfolio_service;
pub mod qa_service;
pub mod report_service;
pub mod risk_service;
pub mod session_service;
pub mod trend_service;
