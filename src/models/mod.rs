mod analysis;
mod conversation;
mod financials;
mod news;
mod portfolio;
mod price_point;
pub mod risk;
mod session;
mod trend;

pub use analysis::{AnalysisPassSummary, AnalysisRecord, TickerAnalysisView};
pub use conversation::{ConversationTurn, FollowUpQuestion};
pub use financials::{FinancialLine, FinancialTable};
pub use news::{NewsDigest, MAX_NEWS_SNIPPETS};
pub use portfolio::{Portfolio, PortfolioRow, PORTFOLIO_COLUMNS};
pub use price_point::{PriceHistory, PricePoint, PriceSeries};
pub use risk::{RiskAssessment, RiskLevel};
pub use session::{PortfolioView, SelectTicker, SessionCreated};
pub use trend::{TrendChart, TrendPanel};
