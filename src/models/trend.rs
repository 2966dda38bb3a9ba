use serde::{Deserialize, Serialize};

use crate::models::PricePoint;

/// One line of a trend chart: a labelled window of closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPanel {
    pub label: String,
    pub points: Vec<PricePoint>,
}

/// Chart data ready for a presentation layer to draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendChart {
    pub title: String,
    pub panels: Vec<TrendPanel>,
    /// Set when the chart could not be built; panels are then empty.
    pub error: Option<String>,
}
