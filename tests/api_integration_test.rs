//! API integration tests
//!
//! Drives the full router in memory with mock market data, news and
//! narrative providers:
//! - session lifecycle (create, end, unknown id)
//! - portfolio upload, analysis pass and ticker selection
//! - per-ticker analysis views with risk and trend data
//! - follow-up questions and conversation history
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tower::ServiceExt;

use portfolio_advisor::app::create_app;
use portfolio_advisor::errors::{LlmError, ProviderError};
use portfolio_advisor::external::market_data_provider::MarketDataProvider;
use portfolio_advisor::models::{FinancialTable, PriceHistory, PricePoint, PriceSeries};
use portfolio_advisor::services::llm_service::{ChunkStream, NarrativeGenerator};
use portfolio_advisor::services::news_service::{NewsProvider, NewsService};
use portfolio_advisor::state::AppState;
use portfolio_advisor::store::sessions::SessionStore;

const HEADER: &str = "Symbol,Average Cost Basis,Last Price,Percent Of Account,\
Total Gain/Loss Dollar,Total Gain/Loss Percent,Today's Gain/Loss Dollar,Today's Gain/Loss Percent";

// ---------------------------------------------------------------------------
// Mock providers
// ---------------------------------------------------------------------------

struct MockMarket;

#[async_trait]
impl MarketDataProvider for MockMarket {
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, ProviderError> {
        let closes: &[f64] = match ticker {
            "MSFT" => &[100.0, 101.0, 99.0, 100.0, 100.0],
            "KO" => &[60.0, 60.0, 60.0, 60.0],
            "TSLA" => &[100.0, 103.0, 99.0, 104.0, 98.0],
            _ => return Err(ProviderError::NotFound),
        };
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::new(NaiveDate::from_ymd_opt(2024, 7, 1 + i as u32).unwrap(), *c))
            .collect();
        Ok(PriceHistory::new(ticker, PriceSeries::new(points)))
    }

    async fn fetch_financials(&self, ticker: &str) -> Result<FinancialTable, ProviderError> {
        Ok(FinancialTable::new(ticker))
    }
}

struct MockNews;

#[async_trait]
impl NewsProvider for MockNews {
    async fn fetch_news(&self, search_term: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![format!("Headline for {}", search_term)])
    }
}

/// Answers every prompt with fixed chunks and keeps the prompts it saw.
#[derive(Default)]
struct MockGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl NarrativeGenerator for MockGenerator {
    async fn generate(&self, prompt: String) -> Result<ChunkStream, LlmError> {
        let reply = if prompt.starts_with("If the query is not related to finance") {
            vec!["Bonds are ", "debt securities."]
        } else {
            vec!["Overview\nA company.", "\n\n", "Investment Recommendation : \nHold the Stock"]
        };
        self.prompts.lock().unwrap().push(prompt);
        Ok(stream::iter(reply.into_iter().map(|c| Ok(c.to_string()))).boxed())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_app() -> (Router, Arc<MockGenerator>) {
    let generator = Arc::new(MockGenerator::default());
    let state = AppState {
        sessions: SessionStore::new(Arc::new(MockMarket)),
        news_service: Arc::new(NewsService::with_provider(Arc::new(MockNews))),
        llm_service: generator.clone(),
    };
    (create_app(state), generator)
}

async fn send(app: &Router, method: Method, uri: &str, body: Body, content_type: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Body::empty(), "application/json").await
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, method, uri, Body::from(body.to_string()), "application/json").await
}

async fn upload(app: &Router, session: &str, csv: String) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/api/sessions/{}/portfolio", session),
        Body::from(csv),
        "text/csv",
    )
    .await
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/sessions", Body::empty(), "application/json").await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn portfolio_csv(symbols: &[&str]) -> String {
    let mut csv = format!("{}\n", HEADER);
    for s in symbols {
        csv.push_str(&format!("{},$100.00,$120.00,25%,$20.00,20%,$1.00,0.8%\n", s));
    }
    csv
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_sessions() {
    let (app, _) = test_app();
    new_session(&app).await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 1);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (app, _) = test_app();
    let id = new_session(&app).await;

    let (status, _) = get(&app, &format!("/api/sessions/{}/portfolio", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/sessions/{}", id);
    let (status, _) = send(&app, Method::DELETE, &uri, Body::empty(), "application/json").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/sessions/{}/conversation", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_analyzes_every_ticker() {
    let (app, generator) = test_app();
    let id = new_session(&app).await;

    let (status, summary) = upload(&app, &id, portfolio_csv(&["MSFT", "KO", "ZZZZ"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["tickers"], serde_json::json!(["MSFT", "KO", "ZZZZ"]));
    assert_eq!(summary["failed_tickers"], serde_json::json!(["ZZZZ"]));
    assert_eq!(summary["selected"], "MSFT");

    let prompts = generator.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].starts_with("Analyze the stock MSFT "));
    assert!(prompts[1].starts_with("Analyze the stock KO "));
    assert!(prompts[2].contains("Error: Unable to retrieve stock data for symbol ZZZZ."));

    let (status, view) = get(&app, &format!("/api/sessions/{}/portfolio", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["analysis_done"], true);
    assert_eq!(view["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_upload_missing_column_is_bad_request() {
    let (app, _) = test_app();
    let id = new_session(&app).await;

    let (status, body) = upload(&app, &id, "Symbol,Last Price\nMSFT,420\n".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("Missing required column: Average Cost Basis"));
}

#[tokio::test]
async fn test_analysis_view_for_selected_and_named_ticker() {
    let (app, _) = test_app();
    let id = new_session(&app).await;
    upload(&app, &id, portfolio_csv(&["MSFT", "KO", "TSLA"])).await;

    let (status, view) = get(&app, &format!("/api/sessions/{}/analysis", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["ticker"], "MSFT");
    assert_eq!(view["risk"]["risk_level"], "moderate");
    assert_eq!(view["risk"]["color"], "orange");
    assert_eq!(
        view["analysis_markdown"],
        "### Overview\nA company.\n\n### Investment Recommendation : \nHold the Stock"
    );
    assert_eq!(view["trend"]["title"], "MSFT Stock Price Trends");

    let (_, view) = get(&app, &format!("/api/sessions/{}/analysis/KO", id)).await;
    assert_eq!(view["risk"]["label"], "Low Risk");
    assert_eq!(view["risk"]["color"], "green");

    let (_, view) = get(&app, &format!("/api/sessions/{}/analysis/TSLA", id)).await;
    assert_eq!(view["risk"]["label"], "High Risk");
    assert_eq!(view["risk"]["color"], "red");

    let (status, _) = get(&app, &format!("/api/sessions/{}/analysis/AAPL", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_selecting_a_ticker_changes_default_view() {
    let (app, _) = test_app();
    let id = new_session(&app).await;
    upload(&app, &id, portfolio_csv(&["MSFT", "KO"])).await;

    let uri = format!("/api/sessions/{}/selected", id);
    let (status, view) = send_json(&app, Method::PUT, &uri, serde_json::json!({"ticker": "KO"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["selected"], "KO");

    let (_, view) = get(&app, &format!("/api/sessions/{}/analysis", id)).await;
    assert_eq!(view["ticker"], "KO");

    let (status, _) = send_json(&app, Method::PUT, &uri, serde_json::json!({"ticker": "NOPE"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reupload_replaces_analysis_keys() {
    let (app, _) = test_app();
    let id = new_session(&app).await;
    upload(&app, &id, portfolio_csv(&["MSFT", "KO"])).await;
    upload(&app, &id, portfolio_csv(&["TSLA"])).await;

    let (status, _) = get(&app, &format!("/api/sessions/{}/analysis/MSFT", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, view) = get(&app, &format!("/api/sessions/{}/portfolio", id)).await;
    assert_eq!(view["tickers"], serde_json::json!(["TSLA"]));
    assert_eq!(view["selected"], "TSLA");
}

#[tokio::test]
async fn test_follow_up_questions_build_conversation() {
    let (app, generator) = test_app();
    let id = new_session(&app).await;
    upload(&app, &id, portfolio_csv(&["MSFT"])).await;

    let uri = format!("/api/sessions/{}/questions", id);
    let (status, turn) = send_json(&app, Method::POST, &uri, serde_json::json!({"query": "What is a bond?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["query"], "What is a bond?");
    assert_eq!(turn["response"], "Bonds are debt securities.");

    let prompt = generator.prompts.lock().unwrap().last().cloned().unwrap();
    assert!(prompt.contains("I'm sorry, but I can only provide information related to finance and stocks."));
    assert!(prompt.contains("Headline for top 10 recent stocks related news only"));
    assert!(prompt.contains("MSFT"));

    let (status, _) = send_json(&app, Method::POST, &uri, serde_json::json!({"query": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = get(&app, &format!("/api/sessions/{}/conversation", id)).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}
