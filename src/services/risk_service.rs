use tracing::{info, warn};

use crate::errors::ComputationError;
use crate::models::{PriceSeries, RiskAssessment};

/// Classify a ticker's risk from the volatility of its daily returns.
///
/// Never fails: any numeric problem comes back as the `Error` level with a
/// gray tag and a readable message.
pub fn assess_risk(ticker: &str, series: &PriceSeries) -> RiskAssessment {
    match compute_volatility(series) {
        Ok(volatility) => {
            let assessment = RiskAssessment::classified(ticker, volatility);
            info!(
                "Risk for {}: {} (volatility {:.4} over {} closes)",
                ticker,
                assessment.label,
                volatility,
                series.len()
            );
            assessment
        }
        Err(e) => {
            warn!("Could not compute risk for {}: {}", ticker, e);
            RiskAssessment::failed(ticker, e)
        }
    }
}

/// Simple period-over-period returns, `(close_i - close_{i-1}) / close_{i-1}`.
pub fn compute_returns(series: &PriceSeries) -> Result<Vec<f64>, ComputationError> {
    let points = series.points();
    if points.len() < 2 {
        return Err(ComputationError::InsufficientData {
            required: 2,
            actual: points.len(),
        });
    }

    let mut returns = Vec::with_capacity(points.len() - 1);
    for pair in points.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if prev.close == 0.0 || !prev.close.is_finite() {
            return Err(ComputationError::InvalidClose {
                date: prev.date,
                value: prev.close,
            });
        }
        if !cur.close.is_finite() {
            return Err(ComputationError::InvalidClose {
                date: cur.date,
                value: cur.close,
            });
        }
        returns.push((cur.close - prev.close) / prev.close);
    }

    Ok(returns)
}

/// Sample standard deviation (n - 1 denominator) of daily returns.
///
/// A single return has no sample deviation, so a two-point series is a
/// computation failure rather than a silent zero.
pub fn compute_volatility(series: &PriceSeries) -> Result<f64, ComputationError> {
    let returns = compute_returns(series)?;
    if returns.len() < 2 {
        return Err(ComputationError::NonFiniteVolatility);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let volatility = variance.sqrt();

    if !volatility.is_finite() {
        return Err(ComputationError::NonFiniteVolatility);
    }

    Ok(volatility)
}
