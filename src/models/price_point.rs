use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily close for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, sorting by date so the ordering invariant holds
    /// whatever order the provider returned.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Points dated on or after `cutoff`.
    pub fn since(&self, cutoff: NaiveDate) -> &[PricePoint] {
        let start = self.points.partition_point(|p| p.date < cutoff);
        &self.points[start..]
    }
}

/// Price series for one ticker plus the one-line quote summary that goes
/// into analysis prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub series: PriceSeries,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, series: PriceSeries) -> Self {
        Self {
            symbol: symbol.into(),
            series,
        }
    }

    pub fn summary(&self) -> String {
        match self.series.last() {
            Some(last) => format!("Symbol: {}\nPrice: {}\n", self.symbol, last.close),
            None => format!("Symbol: {}\nPrice: unavailable\n", self.symbol),
        }
    }
}
