use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{AnalysisPassSummary, ConversationTurn, RiskAssessment, TickerAnalysisView};
use crate::services::csv_import_service::parse_portfolio_csv;
use crate::services::llm_service::NarrativeGenerator;
use crate::services::news_service::NewsService;
use crate::services::{portfolio_service, qa_service, report_service, risk_service, trend_service};
use crate::store::sessions::Session;

/// Load a new portfolio file into the session and run the analysis pass.
pub async fn upload_portfolio(
    session: &mut Session,
    csv: &str,
    news: &NewsService,
    generator: &dyn NarrativeGenerator,
) -> Result<AnalysisPassSummary, AppError> {
    let portfolio = parse_portfolio_csv(csv).map_err(|e| {
        warn!("Rejected portfolio upload for session {}: {:#}", session.id, e);
        AppError::Validation(format!("{:#}", e))
    })?;

    info!("Session {}: loaded portfolio with {} rows", session.id, portfolio.len());
    session.load_portfolio(portfolio.clone());

    let records =
        portfolio_service::analyze_portfolio(&portfolio, &mut session.market_data, news, generator)
            .await;

    let failed_tickers = records
        .iter()
        .filter(|r| r.has_errors())
        .map(|r| r.ticker.clone())
        .collect();
    session.finish_analysis(records);

    Ok(AnalysisPassSummary {
        tickers: portfolio.tickers(),
        failed_tickers,
        selected: session.selected().map(str::to_string),
    })
}

/// Everything shown for one ticker. Trend charts and the risk label are
/// rebuilt from the memoized price history on every call.
pub async fn ticker_view(session: &mut Session, ticker: &str) -> Result<TickerAnalysisView, AppError> {
    let portfolio = session.require_portfolio()?;
    let row = portfolio
        .row(ticker)
        .ok_or_else(|| AppError::NotFound(format!("Ticker {} is not in the portfolio", ticker)))?;
    let performance_markdown = report_service::performance_analysis(row);

    let record = session
        .analysis(ticker)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("No analysis available for {}", ticker)))?;

    let (trend, trend_overlay, risk) = match session.market_data.price_history(ticker).await {
        Ok(history) => (
            trend_service::trend_chart(ticker, &history.series),
            trend_service::trend_overlay(ticker, &history.series),
            risk_service::assess_risk(ticker, &history.series),
        ),
        Err(e) => {
            warn!("Price history unavailable for {}: {}", ticker, e);
            (
                trend_service::failed_chart(ticker, &e),
                trend_service::failed_chart(ticker, &e),
                RiskAssessment::failed(ticker, &e),
            )
        }
    };

    Ok(TickerAnalysisView {
        ticker: ticker.to_string(),
        heading: format!("Analysis for {}:", ticker),
        analysis_markdown: report_service::format_analysis(&record.narrative),
        provider_errors: record.provider_errors,
        performance_markdown,
        trend,
        trend_overlay,
        risk,
    })
}

/// View of the currently selected ticker.
pub async fn selected_view(session: &mut Session) -> Result<TickerAnalysisView, AppError> {
    let ticker = session
        .selected()
        .map(str::to_string)
        .ok_or_else(|| AppError::NotFound("No ticker selected".to_string()))?;
    ticker_view(session, &ticker).await
}

/// Answer a follow-up question and append it to the conversation.
pub async fn ask_question(
    session: &mut Session,
    news: &NewsService,
    generator: &dyn NarrativeGenerator,
    query: &str,
) -> Result<ConversationTurn, AppError> {
    let turn = qa_service::answer_follow_up(generator, news, session.portfolio(), query).await?;
    session.push_turn(turn.clone());
    Ok(turn)
}
