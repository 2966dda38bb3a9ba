use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One statement line (e.g. "Total Revenue") with its value per quarter end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialLine {
    pub metric: String,
    pub values: BTreeMap<NaiveDate, f64>,
}

/// Quarterly financial statement figures for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTable {
    pub symbol: String,
    pub lines: Vec<FinancialLine>,
}

impl FinancialTable {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            lines: Vec::new(),
        }
    }

    pub fn push_line(&mut self, metric: impl Into<String>, values: BTreeMap<NaiveDate, f64>) {
        self.lines.push(FinancialLine {
            metric: metric.into(),
            values,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.values.is_empty())
    }

    /// Quarter end dates across all lines, newest first.
    pub fn periods(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self
            .lines
            .iter()
            .flat_map(|l| l.values.keys().copied())
            .collect();
        dates.into_iter().rev().collect()
    }
}

/// Metric rows by quarter columns, newest quarter first. Missing cells
/// print as `NaN`.
impl fmt::Display for FinancialTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let periods = self.periods();
        let metric_width = self
            .lines
            .iter()
            .map(|l| l.metric.len())
            .max()
            .unwrap_or(0);

        write!(f, "{:w$}", "", w = metric_width)?;
        for period in &periods {
            write!(f, "  {:>16}", period.format("%Y-%m-%d"))?;
        }
        writeln!(f)?;

        for line in &self.lines {
            write!(f, "{:w$}", line.metric, w = metric_width)?;
            for period in &periods {
                match line.values.get(period) {
                    Some(v) => write!(f, "  {:>16.1}", v)?,
                    None => write!(f, "  {:>16}", "NaN")?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_periods_newest_first() {
        let mut table = FinancialTable::new("MSFT");
        table.push_line("Total Revenue", BTreeMap::from([(q(2024, 3, 31), 61.9e9), (q(2023, 12, 31), 62.0e9)]));
        table.push_line("Net Income", BTreeMap::from([(q(2024, 6, 30), 22.0e9)]));
        assert_eq!(table.periods(), vec![q(2024, 6, 30), q(2024, 3, 31), q(2023, 12, 31)]);
    }

    #[test]
    fn test_display_marks_missing_cells() {
        let mut table = FinancialTable::new("MSFT");
        table.push_line("Total Revenue", BTreeMap::from([(q(2024, 3, 31), 100.0), (q(2023, 12, 31), 90.0)]));
        table.push_line("Net Income", BTreeMap::from([(q(2024, 3, 31), 20.0)]));
        let text = table.to_string();
        assert!(text.contains("2024-03-31"));
        let net_income = text.lines().find(|l| l.starts_with("Net Income")).unwrap();
        assert!(net_income.contains("20.0"));
        assert!(net_income.contains("NaN"));
    }

    #[test]
    fn test_empty_table() {
        assert!(FinancialTable::new("X").is_empty());
    }
}
