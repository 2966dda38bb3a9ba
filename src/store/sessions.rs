use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::external::market_data_provider::MarketDataProvider;
use crate::models::{AnalysisRecord, ConversationTurn, Portfolio, PortfolioView};
use crate::services::market_data_service::MarketDataCache;

/// State owned by one user session.
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    portfolio: Option<Portfolio>,
    analysis_results: HashMap<String, AnalysisRecord>,
    analysis_done: bool,
    selected: Option<String>,
    conversation: Vec<ConversationTurn>,
    pub market_data: MarketDataCache,
}

impl Session {
    pub fn new(id: Uuid, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            portfolio: None,
            analysis_results: HashMap::new(),
            analysis_done: false,
            selected: None,
            conversation: Vec::new(),
            market_data: MarketDataCache::new(provider),
        }
    }

    /// Replace the portfolio and forget every analysis of the previous one.
    /// Conversation and cached market data are kept.
    pub fn load_portfolio(&mut self, portfolio: Portfolio) {
        self.analysis_results.clear();
        self.analysis_done = false;
        self.selected = None;
        self.portfolio = Some(portfolio);
    }

    /// Store the records of a finished pass and select the first ticker.
    pub fn finish_analysis(&mut self, records: Vec<AnalysisRecord>) {
        for record in records {
            self.analysis_results.insert(record.ticker.clone(), record);
        }
        self.analysis_done = true;
        self.selected = self
            .portfolio
            .as_ref()
            .and_then(|p| p.rows.first())
            .map(|r| r.symbol.clone());
    }

    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref()
    }

    pub fn require_portfolio(&self) -> Result<&Portfolio, AppError> {
        self.portfolio
            .as_ref()
            .ok_or_else(|| AppError::NotFound("No portfolio uploaded for this session".to_string()))
    }

    pub fn analysis(&self, ticker: &str) -> Option<&AnalysisRecord> {
        self.analysis_results.get(ticker)
    }

    pub fn analyzed_tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.analysis_results.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn is_analysis_done(&self) -> bool {
        self.analysis_done
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, ticker: &str) -> Result<(), AppError> {
        let portfolio = self.require_portfolio()?;
        if portfolio.row(ticker).is_none() {
            return Err(AppError::NotFound(format!("Ticker {} is not in the portfolio", ticker)));
        }
        self.selected = Some(ticker.to_string());
        Ok(())
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        &self.conversation
    }

    pub fn push_turn(&mut self, turn: ConversationTurn) {
        self.conversation.push(turn);
    }

    pub fn portfolio_view(&self) -> Result<PortfolioView, AppError> {
        let portfolio = self.require_portfolio()?;
        Ok(PortfolioView {
            rows: portfolio.rows.clone(),
            tickers: portfolio.tickers(),
            selected: self.selected.clone(),
            analysis_done: self.analysis_done,
        })
    }
}

/// In-memory registry of live sessions.
///
/// Each session sits behind its own async mutex so one interaction runs to
/// completion before the next one for the same session starts.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Arc<Mutex<Session>>>>,
    provider: Arc<dyn MarketDataProvider>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            provider,
        }
    }

    pub fn create(&self) -> (Uuid, DateTime<Utc>) {
        let id = Uuid::new_v4();
        let session = Session::new(id, Arc::clone(&self.provider));
        let created_at = session.created_at;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        info!("Created session {} ({} active)", id, self.sessions.len());
        (id, created_at)
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.remove(&id) {
            Some(_) => {
                info!("Ended session {}", id);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {} not found", id))),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
