use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::ProviderError;
use crate::external::market_data_provider::MarketDataProvider;
use crate::models::{FinancialTable, PriceHistory, PricePoint, PriceSeries};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// Income statement lines requested from the fundamentals time series, in
/// display order.
const QUARTERLY_METRICS: [&str; 10] = [
    "quarterlyTotalRevenue",
    "quarterlyCostOfRevenue",
    "quarterlyGrossProfit",
    "quarterlyOperatingExpense",
    "quarterlyOperatingIncome",
    "quarterlyEBITDA",
    "quarterlyNetIncome",
    "quarterlyBasicEPS",
    "quarterlyDilutedEPS",
    "quarterlyInterestExpense",
];

/// Yahoo Finance provider. No API key required.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; PortfolioAdvisor/0.1)")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: url::Url,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::BadResponse(format!("HTTP {}", resp.status())));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

/// Append the ticker as its own path segment. Symbols such as `BRK/B` are
/// percent-encoded instead of changing the path.
fn endpoint(base: &str, ticker: &str) -> Result<url::Url, ProviderError> {
    let mut url =
        url::Url::parse(base).map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::InvalidRequest(format!("{} cannot take a path", base)))?
        .push(ticker);
    Ok(url)
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooTimeseriesResponse {
    timeseries: YahooTimeseries,
}

#[derive(Debug, Deserialize)]
struct YahooTimeseries {
    result: Option<Vec<serde_json::Value>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooReportedEntry {
    #[serde(rename = "asOfDate")]
    as_of_date: String,
    #[serde(rename = "reportedValue")]
    reported_value: YahooReportedValue,
}

#[derive(Debug, Deserialize)]
struct YahooReportedValue {
    raw: f64,
}

fn parse_chart(ticker: &str, body: YahooChartResponse) -> Result<PriceHistory, ProviderError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(ProviderError::NotFound);
        }
        return Err(ProviderError::BadResponse(error.description));
    }

    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or(ProviderError::NotFound)?;

    let closes = &result
        .indicators
        .quote
        .first()
        .ok_or_else(|| ProviderError::BadResponse("No quote data in response".into()))?
        .close;

    if result.timestamp.len() != closes.len() {
        return Err(ProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let points: Vec<PricePoint> = result
        .timestamp
        .iter()
        .zip(closes.iter())
        .filter_map(|(timestamp, close)| {
            // Skip null closes (market holidays, halted sessions)
            let close = (*close)?;
            let date = chrono::DateTime::from_timestamp(*timestamp, 0)?.date_naive();
            Some(PricePoint::new(date, close))
        })
        .collect();

    if points.is_empty() {
        return Err(ProviderError::NotFound);
    }

    Ok(PriceHistory::new(ticker, PriceSeries::new(points)))
}

fn parse_timeseries(
    ticker: &str,
    body: YahooTimeseriesResponse,
) -> Result<FinancialTable, ProviderError> {
    if let Some(error) = body.timeseries.error {
        return Err(ProviderError::BadResponse(error.description));
    }

    let results = body.timeseries.result.unwrap_or_default();
    let mut by_metric: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for result in results {
        let Some(metric) = result
            .pointer("/meta/type/0")
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            continue;
        };

        let Some(entries) = result.get(&metric).and_then(|v| v.as_array()) else {
            continue;
        };

        let values = by_metric.entry(metric).or_default();
        for entry in entries.iter().filter(|e| !e.is_null()) {
            let parsed: YahooReportedEntry = match serde_json::from_value(entry.clone()) {
                Ok(p) => p,
                Err(e) => {
                    warn!("Skipping malformed financial entry for {}: {}", ticker, e);
                    continue;
                }
            };
            if let Ok(date) = NaiveDate::parse_from_str(&parsed.as_of_date, "%Y-%m-%d") {
                values.insert(date, parsed.reported_value.raw);
            }
        }
    }

    let mut table = FinancialTable::new(ticker);
    for metric in QUARTERLY_METRICS {
        if let Some(values) = by_metric.remove(metric) {
            if !values.is_empty() {
                table.push_line(humanize_metric(metric), values);
            }
        }
    }

    if table.is_empty() {
        return Err(ProviderError::NotFound);
    }

    Ok(table)
}

/// `quarterlyDilutedEPS` -> `Diluted EPS`.
fn humanize_metric(metric: &str) -> String {
    let name = metric.strip_prefix("quarterly").unwrap_or(metric);
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push(' ');
            }
        }
        out.push(*c);
    }

    out
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, ProviderError> {
        info!("Fetching 5y daily history for {} from Yahoo Finance", ticker);

        let url = endpoint(CHART_URL, ticker)?;
        let body: YahooChartResponse = self
            .get_json(
                url,
                &[
                    ("interval", "1d".to_string()),
                    ("range", "5y".to_string()),
                    ("includeAdjustedClose", "true".to_string()),
                ],
            )
            .await?;

        let history = parse_chart(ticker, body)?;
        info!("✓ Fetched {} daily closes for {}", history.series.len(), ticker);
        Ok(history)
    }

    async fn fetch_financials(&self, ticker: &str) -> Result<FinancialTable, ProviderError> {
        info!("Fetching quarterly financials for {} from Yahoo Finance", ticker);

        let now = Utc::now();
        let start = now
            .checked_sub_months(Months::new(60))
            .unwrap_or(now);

        let url = endpoint(TIMESERIES_URL, ticker)?;
        let body: YahooTimeseriesResponse = self
            .get_json(
                url,
                &[
                    ("symbol", ticker.to_string()),
                    ("type", QUARTERLY_METRICS.join(",")),
                    ("period1", start.timestamp().to_string()),
                    ("period2", now.timestamp().to_string()),
                ],
            )
            .await?;

        let table = parse_timeseries(ticker, body)?;
        info!("✓ Fetched {} financial lines for {}", table.lines.len(), ticker);
        Ok(table)
    }
}
