use serde::{Deserialize, Serialize};

/// Daily-return standard deviation below which a ticker is low risk.
pub const LOW_RISK_VOLATILITY: f64 = 0.01;

/// Daily-return standard deviation below which a ticker is moderate risk.
pub const MODERATE_RISK_VOLATILITY: f64 = 0.02;

/// Risk level classification based on return volatility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Error,
}

impl RiskLevel {
    /// Strict `<` below each threshold: exactly 0.01 is moderate, exactly
    /// 0.02 is high.
    pub fn from_volatility(volatility: f64) -> Self {
        if volatility < LOW_RISK_VOLATILITY {
            RiskLevel::Low
        } else if volatility < MODERATE_RISK_VOLATILITY {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::Error => "Error",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Moderate => "orange",
            RiskLevel::High => "red",
            RiskLevel::Error => "gray",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Risk label for one ticker, recomputed every time it is displayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub ticker: String,
    pub risk_level: RiskLevel,
    pub label: String,
    pub color: String,
    pub volatility: Option<f64>,
    pub message: Option<String>,
}

impl RiskAssessment {
    pub fn classified(ticker: &str, volatility: f64) -> Self {
        let risk_level = RiskLevel::from_volatility(volatility);
        Self {
            ticker: ticker.to_string(),
            risk_level,
            label: risk_level.label().to_string(),
            color: risk_level.color().to_string(),
            volatility: Some(volatility),
            message: None,
        }
    }

    pub fn failed(ticker: &str, reason: impl std::fmt::Display) -> Self {
        let message = format!("Error: Unable to calculate risk for {}. {}", ticker, reason);
        Self {
            ticker: ticker.to_string(),
            risk_level: RiskLevel::Error,
            label: message.clone(),
            color: RiskLevel::Error.color().to_string(),
            volatility: None,
            message: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.risk_level == RiskLevel::Error
    }

    /// Badge text such as `Moderate Risk (Volatility: 0.0141)`.
    pub fn badge(&self) -> String {
        match self.volatility {
            Some(v) => format!("{} (Volatility: {:.4})", self.label, v),
            None => self.label.clone(),
        }
    }
}
