use std::fmt;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Column headers of the uploaded portfolio file, in display order.
pub const PORTFOLIO_COLUMNS: [&str; 8] = [
    "Symbol",
    "Average Cost Basis",
    "Last Price",
    "Percent Of Account",
    "Total Gain/Loss Dollar",
    "Total Gain/Loss Percent",
    "Today's Gain/Loss Dollar",
    "Today's Gain/Loss Percent",
];

/// One holding from the uploaded portfolio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub symbol: String,
    pub average_cost_basis: BigDecimal,
    pub last_price: BigDecimal,
    pub percent_of_account: BigDecimal,
    pub total_gain_loss_dollar: BigDecimal,
    pub total_gain_loss_percent: BigDecimal,
    pub todays_gain_loss_dollar: BigDecimal,
    pub todays_gain_loss_percent: BigDecimal,
}

impl PortfolioRow {
    fn cells(&self) -> [String; 8] {
        [
            self.symbol.clone(),
            self.average_cost_basis.to_string(),
            self.last_price.to_string(),
            self.percent_of_account.to_string(),
            self.total_gain_loss_dollar.to_string(),
            self.total_gain_loss_percent.to_string(),
            self.todays_gain_loss_dollar.to_string(),
            self.todays_gain_loss_percent.to_string(),
        ]
    }
}

/// The rows of one uploaded portfolio, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    pub rows: Vec<PortfolioRow>,
}

impl Portfolio {
    pub fn new(rows: Vec<PortfolioRow>) -> Self {
        Self { rows }
    }

    pub fn tickers(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.symbol.clone()).collect()
    }

    pub fn row(&self, ticker: &str) -> Option<&PortfolioRow> {
        self.rows.iter().find(|r| r.symbol == ticker)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Renders the portfolio as an aligned plain-text table, the form it takes
/// inside follow-up prompts.
impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<[String; 8]> = self.rows.iter().map(PortfolioRow::cells).collect();

        let mut widths: Vec<usize> = PORTFOLIO_COLUMNS.iter().map(|c| c.len()).collect();
        for cells in &body {
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let header: Vec<String> = PORTFOLIO_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:>w$}", c, w = widths[i]))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for cells in &body {
            let line: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:>w$}", c, w = widths[i]))
                .collect();
            writeln!(f, "{}", line.join("  "))?;
        }

        Ok(())
    }
}
