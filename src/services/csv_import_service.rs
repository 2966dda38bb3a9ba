use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{info, warn};

use crate::models::{Portfolio, PortfolioRow, PORTFOLIO_COLUMNS};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Average Cost Basis")]
    average_cost_basis: String,
    #[serde(rename = "Last Price")]
    last_price: String,
    #[serde(rename = "Percent Of Account")]
    percent_of_account: String,
    #[serde(rename = "Total Gain/Loss Dollar")]
    total_gain_loss_dollar: String,
    #[serde(rename = "Total Gain/Loss Percent")]
    total_gain_loss_percent: String,
    #[serde(rename = "Today's Gain/Loss Dollar")]
    todays_gain_loss_dollar: String,
    #[serde(rename = "Today's Gain/Loss Percent")]
    todays_gain_loss_percent: String,
}

fn parse_money_string(s: &str) -> Result<BigDecimal> {
    let cleaned = s
        .replace("$", "")
        .replace(",", "")
        .replace("%", "")
        .trim()
        .to_string();

    if cleaned.is_empty() || cleaned == "-" {
        return Ok(BigDecimal::from(0));
    }

    BigDecimal::from_str(&cleaned)
        .with_context(|| format!("Failed to parse money string: {}", s))
}

/// Parse an uploaded portfolio file.
///
/// Every column in [`PORTFOLIO_COLUMNS`] must be present; extra columns are
/// ignored. Rows without a symbol are skipped.
pub fn parse_portfolio_csv(content: &str) -> Result<Portfolio> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header row")?.clone();
    if let Some(missing) = PORTFOLIO_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        anyhow::bail!("Missing required column: {}", missing);
    }

    let mut rows = Vec::new();
    for (line_num, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("Line {}: Failed to parse CSV row", line_num + 2))?;

        if row.symbol.is_empty() {
            warn!("Line {}: skipping row without a symbol", line_num + 2);
            continue;
        }

        rows.push(
            convert_row(row).with_context(|| format!("Line {}: invalid value", line_num + 2))?,
        );
    }

    if rows.is_empty() {
        anyhow::bail!("Portfolio file contains no holdings");
    }

    info!("Parsed portfolio with {} holdings", rows.len());
    Ok(Portfolio::new(rows))
}

fn convert_row(row: CsvRow) -> Result<PortfolioRow> {
    Ok(PortfolioRow {
        average_cost_basis: parse_money_string(&row.average_cost_basis)?,
        last_price: parse_money_string(&row.last_price)?,
        percent_of_account: parse_money_string(&row.percent_of_account)?,
        total_gain_loss_dollar: parse_money_string(&row.total_gain_loss_dollar)?,
        total_gain_loss_percent: parse_money_string(&row.total_gain_loss_percent)?,
        todays_gain_loss_dollar: parse_money_string(&row.todays_gain_loss_dollar)?,
        todays_gain_loss_percent: parse_money_string(&row.todays_gain_loss_percent)?,
        symbol: row.symbol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Symbol,Average Cost Basis,Last Price,Percent Of Account,\
Total Gain/Loss Dollar,Total Gain/Loss Percent,Today's Gain/Loss Dollar,Today's Gain/Loss Percent";

    #[test]
    fn test_parse_money_string() {
        assert_eq!(parse_money_string("$1,234.50").unwrap(), BigDecimal::from_str("1234.50").unwrap());
        assert_eq!(parse_money_string("-2.5%").unwrap(), BigDecimal::from_str("-2.5").unwrap());
        assert_eq!(parse_money_string("-").unwrap(), BigDecimal::from(0));
        assert_eq!(parse_money_string("").unwrap(), BigDecimal::from(0));
        assert!(parse_money_string("abc").is_err());
    }

    #[test]
    fn test_parse_portfolio_in_file_order() {
        let csv = format!(
            "{}\nMSFT,$310.00,$420.10,40%,\"$1,101.00\",35.5%,$2.10,0.5%\nAAPL,150,189.5,12.5,392.5,26.12,-4.1,-0.21\n",
            HEADER
        );
        let portfolio = parse_portfolio_csv(&csv).unwrap();
        assert_eq!(portfolio.tickers(), vec!["MSFT".to_string(), "AAPL".to_string()]);

        let msft = portfolio.row("MSFT").unwrap();
        assert_eq!(msft.total_gain_loss_dollar, BigDecimal::from_str("1101.00").unwrap());
        assert_eq!(msft.percent_of_account, BigDecimal::from(40));
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = format!("Account,{}\nIRA,NVDA,1,2,3,4,5,6,7\n", HEADER);
        let portfolio = parse_portfolio_csv(&csv).unwrap();
        assert_eq!(portfolio.tickers(), vec!["NVDA".to_string()]);
    }

    #[test]
    fn test_missing_column_is_named() {
        let csv = "Symbol,Last Price\nMSFT,420\n";
        let err = parse_portfolio_csv(csv).unwrap_err();
        assert_eq!(err.to_string(), "Missing required column: Average Cost Basis");
    }

    #[test]
    fn test_empty_portfolio_is_rejected() {
        let csv = format!("{}\n", HEADER);
        assert!(parse_portfolio_csv(&csv).is_err());
    }

    #[test]
    fn test_bad_cell_reports_line() {
        let csv = format!("{}\nMSFT,abc,1,2,3,4,5,6\n", HEADER);
        let err = parse_portfolio_csv(&csv).unwrap_err();
        assert!(format!("{:#}", err).starts_with("Line 2: invalid value"));
    }
}
