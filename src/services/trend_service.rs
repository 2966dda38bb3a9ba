use chrono::{Days, Months, NaiveDate};

use crate::models::{PricePoint, PriceSeries, TrendChart, TrendPanel};

#[derive(Debug, Clone, Copy)]
enum Window {
    Months(u32),
    Days(u64),
    /// Last N closes, whatever their dates.
    Sessions(usize),
}

/// Side-by-side panels: calendar windows measured back from the latest close.
const PANEL_WINDOWS: [(&str, Window); 4] = [
    ("5 Years", Window::Months(60)),
    ("1 Year", Window::Months(12)),
    ("1 Month", Window::Months(1)),
    ("5 Days", Window::Days(5)),
];

/// Overlaid lines on one chart.
const OVERLAY_WINDOWS: [(&str, Window); 5] = [
    ("5y trend", Window::Months(60)),
    ("1y trend", Window::Months(12)),
    ("6mo trend", Window::Months(6)),
    ("1mo trend", Window::Months(1)),
    ("5d trend", Window::Sessions(5)),
];

pub fn chart_title(ticker: &str) -> String {
    format!("{} Stock Price Trends", ticker)
}

/// Four-panel trend chart for a ticker.
pub fn trend_chart(ticker: &str, series: &PriceSeries) -> TrendChart {
    build_chart(ticker, series, &PANEL_WINDOWS)
}

/// Single chart with one line per lookback window.
pub fn trend_overlay(ticker: &str, series: &PriceSeries) -> TrendChart {
    build_chart(ticker, series, &OVERLAY_WINDOWS)
}

/// Chart carrying only an error, used when the price series is unavailable.
pub fn failed_chart(ticker: &str, reason: impl std::fmt::Display) -> TrendChart {
    TrendChart {
        title: chart_title(ticker),
        panels: Vec::new(),
        error: Some(format!("Error: Unable to plot the trends for {}. {}", ticker, reason)),
    }
}

fn build_chart(ticker: &str, series: &PriceSeries, windows: &[(&str, Window)]) -> TrendChart {
    let Some(latest) = series.last().map(|p| p.date) else {
        return failed_chart(ticker, "no price data");
    };

    let panels = windows
        .iter()
        .map(|(label, window)| TrendPanel {
            label: label.to_string(),
            points: window_points(series, latest, *window),
        })
        .collect();

    TrendChart {
        title: chart_title(ticker),
        panels,
        error: None,
    }
}

fn window_points(series: &PriceSeries, latest: NaiveDate, window: Window) -> Vec<PricePoint> {
    let cutoff = match window {
        Window::Months(n) => latest.checked_sub_months(Months::new(n)),
        Window::Days(n) => latest.checked_sub_days(Days::new(n)),
        Window::Sessions(n) => {
            let points = series.points();
            return points[points.len().saturating_sub(n)..].to_vec();
        }
    };

    match cutoff {
        Some(cutoff) => series.since(cutoff).to_vec(),
        None => series.points().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_series(start: NaiveDate, days: u64) -> PriceSeries {
        PriceSeries::new(
            (0..days)
                .map(|i| PricePoint::new(start + Days::new(i), 100.0 + i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_panels_are_cut_from_latest_date() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series = daily_series(start, 731);
        let latest = series.last().unwrap().date;

        let chart = trend_chart("MSFT", &series);
        assert_eq!(chart.title, "MSFT Stock Price Trends");
        assert!(chart.error.is_none());

        let labels: Vec<&str> = chart.panels.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["5 Years", "1 Year", "1 Month", "5 Days"]);

        assert_eq!(chart.panels[0].points.len(), 731);
        assert_eq!(
            chart.panels[1].points.first().unwrap().date,
            latest.checked_sub_months(Months::new(12)).unwrap()
        );
        // Cutoff date is inclusive.
        assert_eq!(chart.panels[3].points.len(), 6);
        assert_eq!(chart.panels[3].points.last().unwrap().date, latest);
    }

    #[test]
    fn test_overlay_windows() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = daily_series(start, 400);

        let chart = trend_overlay("AAPL", &series);
        let labels: Vec<&str> = chart.panels.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["5y trend", "1y trend", "6mo trend", "1mo trend", "5d trend"]);
        assert_eq!(chart.panels[4].points.len(), 5);
    }

    #[test]
    fn test_short_series_keeps_every_point() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let series = daily_series(start, 3);
        let chart = trend_overlay("X", &series);
        assert!(chart.panels.iter().all(|p| p.points.len() == 3));
    }

    #[test]
    fn test_empty_series_yields_error_chart() {
        let chart = trend_chart("NVDA", &PriceSeries::default());
        assert!(chart.panels.is_empty());
        assert_eq!(
            chart.error.as_deref(),
            Some("Error: Unable to plot the trends for NVDA. no price data")
        );
    }
}
