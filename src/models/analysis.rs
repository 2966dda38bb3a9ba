use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{RiskAssessment, TrendChart};

/// Generated analysis for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub ticker: String,
    pub narrative: String,
    /// Inline error strings that stood in for failed provider calls.
    pub provider_errors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn has_errors(&self) -> bool {
        !self.provider_errors.is_empty()
    }
}

/// Everything a page needs to show one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerAnalysisView {
    pub ticker: String,
    pub heading: String,
    pub analysis_markdown: String,
    pub provider_errors: Vec<String>,
    pub performance_markdown: String,
    pub trend: TrendChart,
    pub trend_overlay: TrendChart,
    pub risk: RiskAssessment,
}

/// Summary of a finished analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPassSummary {
    pub tickers: Vec<String>,
    pub failed_tickers: Vec<String>,
    pub selected: Option<String>,
}
