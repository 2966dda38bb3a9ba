use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PortfolioRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Current portfolio of a session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioView {
    pub rows: Vec<PortfolioRow>,
    pub tickers: Vec<String>,
    pub selected: Option<String>,
    pub analysis_done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTicker {
    pub ticker: String,
}
